//! Garment catalogue and preview geometry.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::placement::DesignPlacement;

macro_rules! catalogue_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal, $label:literal;)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Value used on the wire and in form fields.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            #[must_use]
            pub const fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($name), ": {}"), s)),
                }
            }
        }
    };
}

catalogue_enum! {
    /// Shirt colours on offer.
    GarmentColor {
        White => "white", "White";
        Black => "black", "Black";
        Navy => "navy", "Navy";
        Red => "red", "Red";
        Green => "green", "Green";
        Purple => "purple", "Purple";
        Orange => "orange", "Orange";
        Pink => "pink", "Pink";
    }
}

impl GarmentColor {
    /// Fill colour of the preview silhouette.
    #[must_use]
    pub const fn hex(&self) -> &'static str {
        match self {
            Self::White => "#ffffff",
            Self::Black => "#000000",
            Self::Navy => "#1e40af",
            Self::Red => "#dc2626",
            Self::Green => "#16a34a",
            Self::Purple => "#9333ea",
            Self::Orange => "#ea580c",
            Self::Pink => "#ec4899",
        }
    }
}

impl Default for GarmentColor {
    fn default() -> Self {
        Self::White
    }
}

catalogue_enum! {
    GarmentSize {
        Xs => "XS", "XS";
        S => "S", "S";
        M => "M", "M";
        L => "L", "L";
        Xl => "XL", "XL";
        Xxl => "XXL", "XXL";
    }
}

impl Default for GarmentSize {
    fn default() -> Self {
        Self::M
    }
}

catalogue_enum! {
    /// Which side of the shirt the artwork is printed on.
    GarmentView {
        Front => "front", "Front";
        Back => "back", "Back";
    }
}

impl Default for GarmentView {
    fn default() -> Self {
        Self::Front
    }
}

impl GarmentView {
    /// Silhouette outline for [`PreviewLayout::WIDTH`] by
    /// [`PreviewLayout::HEIGHT`] canvas units. The back has a shallower collar.
    #[must_use]
    pub const fn silhouette_path(&self) -> &'static str {
        match self {
            Self::Front => {
                "M120 40 L162 26 Q200 70 238 26 L280 40 L372 104 L336 170 L300 150 \
                 L300 420 L100 420 L100 150 L64 170 L28 104 Z"
            }
            Self::Back => {
                "M120 40 L162 26 Q200 42 238 26 L280 40 L372 104 L336 170 L300 150 \
                 L300 420 L100 420 L100 150 L64 170 L28 104 Z"
            }
        }
    }
}

/// Where the artwork lands on the preview canvas.
///
/// The artwork centre sits at `50 + x/6` percent of the width and `40 + y/6`
/// percent of the height, then the artwork is scaled and rotated about its
/// own centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewLayout {
    pub left_percent: f64,
    pub top_percent: f64,
    pub scale: f64,
    pub rotation: u16,
}

impl PreviewLayout {
    pub const WIDTH: f64 = 400.0;
    pub const HEIGHT: f64 = 440.0;
    /// Edge length of the square the artwork is fitted into before scaling.
    pub const ARTWORK_BOX: f64 = 120.0;

    #[must_use]
    pub fn for_placement(placement: &DesignPlacement) -> Self {
        Self {
            left_percent: 50.0 + f64::from(placement.x()) / 6.0,
            top_percent: 40.0 + f64::from(placement.y()) / 6.0,
            scale: placement.scale(),
            rotation: placement.rotation(),
        }
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        Self::WIDTH * self.left_percent / 100.0
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        Self::HEIGHT * self.top_percent / 100.0
    }

    /// SVG `transform` attribute for the artwork group.
    #[must_use]
    pub fn svg_transform(&self) -> String {
        format!(
            "translate({:.2} {:.2}) rotate({}) scale({:.2})",
            self.center_x(),
            self.center_y(),
            self.rotation,
            self.scale
        )
    }
}
