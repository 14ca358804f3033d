//! Position, scale and rotation of artwork on the garment.
//!
//! Coordinates use screen orientation: `x` grows to the right and `y` grows
//! downwards, so nudging "up" decreases `y`. Every adjustment saturates at its
//! bounds instead of failing.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Offset applied per directional nudge.
pub const POSITION_STEP: i32 = 15;
/// Offsets are clamped to `[-POSITION_LIMIT, POSITION_LIMIT]` on both axes.
pub const POSITION_LIMIT: i32 = 100;
/// Scale change per step, in hundredths.
const SCALE_STEP: u32 = 15;
const SCALE_MIN: u32 = 30;
const SCALE_MAX: u32 = 250;
const SCALE_DEFAULT: u32 = 100;
/// Rotation change per step, in degrees.
pub const ROTATION_STEP: u16 = 15;

/// One interaction with the placement controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignAction {
    Up,
    Down,
    Left,
    Right,
    Larger,
    Smaller,
    RotateClockwise,
    RotateCounterClockwise,
    Reset,
}

impl DesignAction {
    pub const ALL: [Self; 9] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Larger,
        Self::Smaller,
        Self::RotateClockwise,
        Self::RotateCounterClockwise,
        Self::Reset,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Larger => "larger",
            Self::Smaller => "smaller",
            Self::RotateClockwise => "rotate_clockwise",
            Self::RotateCounterClockwise => "rotate_counter_clockwise",
            Self::Reset => "reset",
        }
    }

    /// Button caption on the designer page.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Larger => "Larger",
            Self::Smaller => "Smaller",
            Self::RotateClockwise => "Rotate ⟳",
            Self::RotateCounterClockwise => "Rotate ⟲",
            Self::Reset => "Reset",
        }
    }
}

impl fmt::Display for DesignAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DesignAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown design action: {s}"))
    }
}

/// Where the artwork sits on the garment.
///
/// Scale is held in hundredths so repeated steps land exactly on the
/// documented bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesignPlacement {
    x: i32,
    y: i32,
    scale_hundredths: u32,
    rotation: u16,
}

impl Default for DesignPlacement {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            scale_hundredths: SCALE_DEFAULT,
            rotation: 0,
        }
    }
}

impl DesignPlacement {
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Scale factor, `1.0` being the artwork's natural size.
    #[must_use]
    pub fn scale(&self) -> f64 {
        f64::from(self.scale_hundredths) / 100.0
    }

    /// Rotation in whole degrees, always in `[0, 360)`.
    #[must_use]
    pub const fn rotation(&self) -> u16 {
        self.rotation
    }

    /// Apply one control interaction.
    #[must_use]
    pub fn apply(self, action: DesignAction) -> Self {
        match action {
            DesignAction::Up => self.nudged(0, -POSITION_STEP),
            DesignAction::Down => self.nudged(0, POSITION_STEP),
            DesignAction::Left => self.nudged(-POSITION_STEP, 0),
            DesignAction::Right => self.nudged(POSITION_STEP, 0),
            DesignAction::Larger => Self {
                scale_hundredths: (self.scale_hundredths + SCALE_STEP).min(SCALE_MAX),
                ..self
            },
            DesignAction::Smaller => Self {
                scale_hundredths: self
                    .scale_hundredths
                    .saturating_sub(SCALE_STEP)
                    .max(SCALE_MIN),
                ..self
            },
            DesignAction::RotateClockwise => self.rotated(i32::from(ROTATION_STEP)),
            DesignAction::RotateCounterClockwise => self.rotated(-i32::from(ROTATION_STEP)),
            DesignAction::Reset => Self::default(),
        }
    }

    fn nudged(self, dx: i32, dy: i32) -> Self {
        let clamp = |v: i32| v.clamp(-POSITION_LIMIT, POSITION_LIMIT);
        Self {
            x: clamp(self.x + dx),
            y: clamp(self.y + dy),
            ..self
        }
    }

    fn rotated(self, degrees: i32) -> Self {
        let wrapped = (i32::from(self.rotation) + degrees).rem_euclid(360);
        Self {
            rotation: u16::try_from(wrapped).unwrap_or(0),
            ..self
        }
    }

    /// Build a placement from raw values, clamping each into range.
    #[must_use]
    pub fn clamped(x: i32, y: i32, scale: f64, rotation: i32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hundredths = (scale * 100.0)
            .round()
            .clamp(f64::from(SCALE_MIN), f64::from(SCALE_MAX)) as u32;
        Self {
            x: x.clamp(-POSITION_LIMIT, POSITION_LIMIT),
            y: y.clamp(-POSITION_LIMIT, POSITION_LIMIT),
            scale_hundredths: hundredths,
            rotation: u16::try_from(rotation.rem_euclid(360)).unwrap_or(0),
        }
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn apply_all(start: DesignPlacement, actions: &[DesignAction]) -> DesignPlacement {
        actions.iter().fold(start, |p, a| p.apply(*a))
    }

    #[test]
    fn test_nudges_never_leave_bounds() {
        let directions = [
            DesignAction::Up,
            DesignAction::Down,
            DesignAction::Left,
            DesignAction::Right,
        ];
        // Deterministic pseudo-random walk over the four directions.
        let mut p = DesignPlacement::default();
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..2_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let action = directions[(seed % 4) as usize];
            p = p.apply(action);
            assert!((-100..=100).contains(&p.x()), "x escaped: {p:?}");
            assert!((-100..=100).contains(&p.y()), "y escaped: {p:?}");
        }
    }

    #[test]
    fn test_nudges_saturate_at_limits() {
        let p = apply_all(DesignPlacement::default(), &[DesignAction::Right; 20]);
        assert_eq!(p.x(), 100);
        let p = apply_all(p, &[DesignAction::Up; 7]);
        assert_eq!(p.y(), -100);
        let p = p.apply(DesignAction::Down);
        assert_eq!(p.y(), -85);
    }

    #[test]
    fn test_up_decreases_y() {
        let p = DesignPlacement::default().apply(DesignAction::Up);
        assert_eq!((p.x(), p.y()), (0, -15));
        let p = p.apply(DesignAction::Left);
        assert_eq!((p.x(), p.y()), (-15, -15));
    }

    #[test]
    fn test_scale_saturates_both_ways() {
        let big = apply_all(DesignPlacement::default(), &[DesignAction::Larger; 50]);
        assert!((big.scale() - 2.5).abs() < f64::EPSILON);
        let small = apply_all(big, &[DesignAction::Smaller; 50]);
        assert!((small.scale() - 0.3).abs() < f64::EPSILON);
        for p in [big, small] {
            assert!((0.3..=2.5).contains(&p.scale()));
        }
    }

    #[test]
    fn test_scale_steps_by_fifteen_hundredths() {
        let p = DesignPlacement::default().apply(DesignAction::Larger);
        assert!((p.scale() - 1.15).abs() < 1e-9);
        let p = p.apply(DesignAction::Smaller).apply(DesignAction::Smaller);
        assert!((p.scale() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_wraps() {
        let p = DesignPlacement::clamped(0, 0, 1.0, 350).apply(DesignAction::RotateClockwise);
        assert_eq!(p.rotation(), 5);
        let p = DesignPlacement::default().apply(DesignAction::RotateCounterClockwise);
        assert_eq!(p.rotation(), 345);
        let full_turn = apply_all(DesignPlacement::default(), &[DesignAction::RotateClockwise; 24]);
        assert_eq!(full_turn.rotation(), 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let moved = apply_all(
            DesignPlacement::default(),
            &[
                DesignAction::Up,
                DesignAction::Right,
                DesignAction::Larger,
                DesignAction::RotateClockwise,
            ],
        );
        assert_ne!(moved, DesignPlacement::default());
        assert_eq!(moved.apply(DesignAction::Reset), DesignPlacement::default());
        let d = DesignPlacement::default();
        assert_eq!((d.x(), d.y(), d.rotation()), (0, 0, 0));
        assert!((d.scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in DesignAction::ALL {
            assert_eq!(action.as_str().parse::<DesignAction>(), Ok(action));
        }
        assert!("spin".parse::<DesignAction>().is_err());
    }
}
