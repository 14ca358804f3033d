//! Stored placement components: positions, rotations and scales.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendClient, BackendError, PlacementComponent, Position, Rotation, Scale};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Notice, PageContext};
use crate::state::AppState;

/// Which component table a route addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Position,
    Rotation,
    Scale,
}

impl ComponentKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Position => Position::PATH,
            Self::Rotation => Rotation::PATH,
            Self::Scale => Scale::PATH,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Position => Position::LABEL,
            Self::Rotation => Rotation::LABEL,
            Self::Scale => Scale::LABEL,
        }
    }
}

impl FromStr for ComponentKind {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "position" => Ok(Self::Position),
            "rotation" => Ok(Self::Rotation),
            "scale" => Ok(Self::Scale),
            other => Err(AppError::NotFound(format!("placement kind {other}"))),
        }
    }
}

/// One editable number on a component row.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub value: String,
}

/// A stored component for the placements template.
#[derive(Debug, Clone)]
pub struct ComponentRow {
    pub id: Option<i64>,
    pub kind: &'static str,
    pub fields: Vec<FieldView>,
}

fn field(name: &'static str, value: f64) -> FieldView {
    FieldView {
        name,
        value: format!("{value}"),
    }
}

impl From<&Position> for ComponentRow {
    fn from(p: &Position) -> Self {
        Self {
            id: p.id(),
            kind: Position::PATH,
            fields: vec![field("x", p.x), field("y", p.y), field("z", p.z)],
        }
    }
}

impl From<&Rotation> for ComponentRow {
    fn from(r: &Rotation) -> Self {
        Self {
            id: r.id(),
            kind: Rotation::PATH,
            fields: vec![field("angle", r.angle)],
        }
    }
}

impl From<&Scale> for ComponentRow {
    fn from(s: &Scale) -> Self {
        Self {
            id: s.id(),
            kind: Scale::PATH,
            fields: vec![field("value", s.value)],
        }
    }
}

/// Values posted from a component row. Only the fields of the addressed
/// kind are read.
#[derive(Debug, Default, Deserialize)]
pub struct ComponentForm {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub angle: Option<f64>,
    pub value: Option<f64>,
}

fn require(value: Option<f64>, name: &str) -> Result<f64> {
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("{name} must be a number")))
}

impl ComponentForm {
    fn apply_to_position(&self, position: &mut Position) -> Result<()> {
        position.x = require(self.x, "x")?;
        position.y = require(self.y, "y")?;
        if let Some(z) = self.z {
            position.z = require(Some(z), "z")?;
        }
        Ok(())
    }

    fn apply_to_rotation(&self, rotation: &mut Rotation) -> Result<()> {
        rotation.angle = require(self.angle, "angle")?;
        Ok(())
    }

    fn apply_to_scale(&self, scale: &mut Scale) -> Result<()> {
        scale.value = require(self.value, "value")?;
        Ok(())
    }
}

/// Placements listing template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/placements.html")]
pub struct PlacementsTemplate {
    pub page: PageContext,
    pub sections: Vec<SectionView>,
}

/// One table on the placements page.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub title: &'static str,
    pub rows: Vec<ComponentRow>,
    pub load_failed: bool,
}

fn section<C>(title: &'static str, loaded: std::result::Result<Vec<C>, BackendError>) -> SectionView
where
    C: PlacementComponent,
    for<'a> ComponentRow: From<&'a C>,
{
    match loaded {
        Ok(records) => SectionView {
            title,
            rows: records.iter().map(ComponentRow::from).collect(),
            load_failed: false,
        },
        Err(e) => {
            tracing::error!(error = %e, kind = C::PATH, "Failed to fetch placement components");
            SectionView {
                title,
                rows: Vec::new(),
                load_failed: true,
            }
        }
    }
}

/// List stored positions, rotations and scales.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Response> {
    let backend = admin.backend(state.backend());
    let (positions, rotations, scales) = tokio::join!(
        backend.list_components::<Position>(),
        backend.list_components::<Rotation>(),
        backend.list_components::<Scale>(),
    );

    Ok(PlacementsTemplate {
        page: PageContext::load(&session, Some(admin)).await,
        sections: vec![
            section("Positions", positions),
            section("Rotations", rotations),
            section("Scales", scales),
        ],
    }
    .into_response())
}

async fn edit_component<C: PlacementComponent>(
    backend: &BackendClient,
    id: i64,
    apply: impl FnOnce(&mut C) -> Result<()>,
) -> Result<()> {
    let mut component = backend.read_component::<C>(id).await?;
    apply(&mut component)?;
    backend.update_component(&component).await?;
    Ok(())
}

/// Overwrite one stored component with the posted values.
#[instrument(skip(state, session, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path((kind, id)): Path<(String, i64)>,
    Form(form): Form<ComponentForm>,
) -> Result<Response> {
    let kind: ComponentKind = kind.parse()?;
    let backend = admin.backend(state.backend());

    let result = match kind {
        ComponentKind::Position => {
            edit_component::<Position>(&backend, id, |p| form.apply_to_position(p)).await
        }
        ComponentKind::Rotation => {
            edit_component::<Rotation>(&backend, id, |r| form.apply_to_rotation(r)).await
        }
        ComponentKind::Scale => {
            edit_component::<Scale>(&backend, id, |s| form.apply_to_scale(s)).await
        }
    };

    let notice = match result {
        Ok(()) => Notice::success(format!("{} {id} updated", kind.label())),
        Err(AppError::BadRequest(message)) => Notice::error(message),
        Err(AppError::Backend(e)) => {
            tracing::warn!(error = %e, kind = kind.as_str(), id, "Component update failed");
            Notice::error(e.user_message(&format!("Failed to update {}", kind.as_str())))
        }
        Err(other) => return Err(other),
    };
    notice.flash(&session).await?;
    Ok(Redirect::to("/admin/placements").into_response())
}

/// Delete one stored component.
#[instrument(skip(state, session, admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Response> {
    let kind: ComponentKind = kind.parse()?;
    let backend = admin.backend(state.backend());

    let result = match kind {
        ComponentKind::Position => backend.delete_component::<Position>(id).await,
        ComponentKind::Rotation => backend.delete_component::<Rotation>(id).await,
        ComponentKind::Scale => backend.delete_component::<Scale>(id).await,
    };

    let notice = match result {
        Ok(()) => Notice::success(format!("{} {id} deleted", kind.label())),
        Err(e) => {
            tracing::warn!(error = %e, kind = kind.as_str(), id, "Component delete failed");
            Notice::error(e.user_message(&format!("Failed to delete {}", kind.as_str())))
        }
    };
    notice.flash(&session).await?;
    Ok(Redirect::to("/admin/placements").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("rotation".parse::<ComponentKind>().unwrap(), ComponentKind::Rotation);
        assert!(matches!(
            "placement".parse::<ComponentKind>(),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_position_form_keeps_z_when_absent() {
        let mut position = Position { position_id: None, x: 0.0, y: 0.0, z: 2.0 };
        let form = ComponentForm { x: Some(15.0), y: Some(-30.0), ..ComponentForm::default() };
        form.apply_to_position(&mut position).unwrap();
        assert_eq!((position.x, position.y, position.z), (15.0, -30.0, 2.0));
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let mut scale = Scale { scale_id: None, value: 1.0 };
        let err = ComponentForm::default().apply_to_scale(&mut scale).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m == "value must be a number"));
        assert!((scale.value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rows_list_fields_in_order() {
        let row = ComponentRow::from(&Position { position_id: None, x: 1.5, y: 2.0, z: 0.0 });
        assert_eq!(row.kind, "position");
        let names: Vec<_> = row.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["x", "y", "z"]);
        assert_eq!(row.fields[0].value, "1.5");
    }
}
