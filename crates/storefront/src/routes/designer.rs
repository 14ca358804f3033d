//! Design placement editor.
//!
//! The draft lives in the session and every control is a plain form post that
//! redirects back to `GET /designer`, which redraws the SVG preview. Artwork is
//! held in the [`UploadStore`](crate::services::UploadStore) until the design
//! is saved; only then is anything sent to the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use teeforge_core::cart::CartItem;
use teeforge_core::design::{
    DesignAction, DesignDraft, GarmentColor, GarmentSize, GarmentView, PreviewLayout,
    UploadRejection, check_image_upload,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session::{clear_draft, load_cart, load_draft, save_cart, save_draft};
use crate::models::{Notice, PageContext};
use crate::services::{StoredUpload, save_design};
use crate::state::AppState;

/// File name used when the browser sends none.
const FALLBACK_FILE_NAME: &str = "design";

// =============================================================================
// View Types
// =============================================================================

/// One entry of a colour, size or view picker.
pub struct ChoiceView {
    pub value: &'static str,
    pub label: &'static str,
    pub swatch: Option<&'static str>,
    pub selected: bool,
}

/// The SVG preview.
pub struct PreviewView {
    pub width: f64,
    pub height: f64,
    pub silhouette: &'static str,
    pub fill: &'static str,
    pub artwork_url: Option<String>,
    pub transform: String,
    pub box_size: f64,
    pub box_offset: f64,
}

/// Designer page template.
#[derive(Template, WebTemplate)]
#[template(path = "designer/show.html")]
pub struct DesignerTemplate {
    pub page: PageContext,
    pub draft: DesignDraft,
    pub preview: PreviewView,
    pub colors: Vec<ChoiceView>,
    pub sizes: Vec<ChoiceView>,
    pub views: Vec<ChoiceView>,
    pub actions: &'static [DesignAction],
    pub unit_price: String,
    pub max_upload_mb: u64,
    pub backend_connected: bool,
}

fn color_choices(selected: GarmentColor) -> Vec<ChoiceView> {
    GarmentColor::ALL
        .iter()
        .map(|c| ChoiceView {
            value: c.as_str(),
            label: c.label(),
            swatch: Some(c.hex()),
            selected: *c == selected,
        })
        .collect()
}

fn size_choices(selected: GarmentSize) -> Vec<ChoiceView> {
    GarmentSize::ALL
        .iter()
        .map(|s| ChoiceView {
            value: s.as_str(),
            label: s.label(),
            swatch: None,
            selected: *s == selected,
        })
        .collect()
}

fn view_choices(selected: GarmentView) -> Vec<ChoiceView> {
    GarmentView::ALL
        .iter()
        .map(|v| ChoiceView {
            value: v.as_str(),
            label: v.label(),
            swatch: None,
            selected: *v == selected,
        })
        .collect()
}

fn preview(draft: &DesignDraft, artwork_url: Option<String>) -> PreviewView {
    let layout = PreviewLayout::for_placement(&draft.placement);
    PreviewView {
        width: PreviewLayout::WIDTH,
        height: PreviewLayout::HEIGHT,
        silhouette: draft.view.silhouette_path(),
        fill: draft.color.hex(),
        artwork_url,
        transform: layout.svg_transform(),
        box_size: PreviewLayout::ARTWORK_BOX,
        box_offset: -PreviewLayout::ARTWORK_BOX / 2.0,
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Placement control form data.
#[derive(Debug, Deserialize)]
pub struct AdjustForm {
    pub action: String,
}

/// Garment and order options form data. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct OptionsForm {
    pub color: Option<String>,
    pub size: Option<String>,
    pub view: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the editor.
#[instrument(skip(state, session, current_user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    let mut draft = load_draft(&session).await?;

    let mut artwork_url = None;
    if let Some(artwork) = draft.artwork.clone() {
        match state.uploads().get(&artwork).await {
            Some(stored) => artwork_url = Some(stored.data_url()),
            None => {
                tracing::info!(key = %artwork.key, "Held artwork expired");
                draft.remove_artwork();
                save_draft(&session, &draft).await?;
                Notice::info("Your uploaded image has expired. Please upload it again.")
                    .flash(&session)
                    .await?;
            }
        }
    }

    let backend_connected = current_user.backend(state.backend()).is_reachable().await;

    let designer = &state.config().designer;
    Ok(DesignerTemplate {
        preview: preview(&draft, artwork_url),
        colors: color_choices(draft.color),
        sizes: size_choices(draft.size),
        views: view_choices(draft.view),
        actions: &DesignAction::ALL,
        unit_price: designer.unit_price.to_string(),
        max_upload_mb: designer.max_upload_bytes / (1024 * 1024),
        backend_connected,
        page: PageContext::load(&session, Some(current_user)).await,
        draft,
    }
    .into_response())
}

/// Accept an artwork upload.
///
/// The file is read chunk by chunk and abandoned as soon as it passes the size
/// limit. A rejected file leaves the draft exactly as it was.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_current_user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Response> {
    let limit = state.config().designer.max_upload_bytes;

    let upload = match read_artwork(&mut multipart, limit).await {
        Ok(upload) => upload,
        Err(rejection) => {
            tracing::info!(%rejection, "Artwork rejected");
            Notice::error(rejection.to_string()).flash(&session).await?;
            return Ok(Redirect::to("/designer").into_response());
        }
    };

    let artwork = state.uploads().insert(upload).await;
    tracing::info!(file = %artwork.file_name, size = artwork.size, "Artwork accepted");

    let mut draft = load_draft(&session).await?;
    if let Some(previous) = draft.attach_artwork(artwork) {
        state.uploads().remove(&previous).await;
    }
    save_draft(&session, &draft).await?;

    Notice::success("Image uploaded successfully!")
        .flash(&session)
        .await?;
    Ok(Redirect::to("/designer").into_response())
}

/// Read the `file` field, enforcing type and size.
async fn read_artwork(
    multipart: &mut Multipart,
    limit: u64,
) -> std::result::Result<StoredUpload, UploadRejection> {
    let too_large = |e: &MultipartError| e.status() == StatusCode::PAYLOAD_TOO_LARGE;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadRejection::Empty),
            Err(e) if too_large(&e) => return Err(UploadRejection::TooLarge { limit }),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed upload");
                return Err(UploadRejection::Empty);
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_owned();

        // Type is checked before reading any bytes.
        check_image_upload(content_type.as_deref(), 1, limit)?;

        let mut field = field;
        let mut bytes = Vec::new();
        let mut received: u64 = 0;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    received += chunk.len() as u64;
                    // Past the limit the rest is read and dropped so the
                    // rejection reaches the client on an intact connection.
                    if received <= limit {
                        bytes.extend_from_slice(&chunk);
                    }
                }
                Ok(None) => break,
                Err(e) if too_large(&e) => return Err(UploadRejection::TooLarge { limit }),
                Err(e) => {
                    tracing::warn!(error = %e, "Upload interrupted");
                    return Err(UploadRejection::Empty);
                }
            }
        }
        if received > limit {
            return Err(UploadRejection::TooLarge { limit });
        }

        check_image_upload(content_type.as_deref(), bytes.len() as u64, limit)?;
        return Ok(StoredUpload {
            file_name,
            content_type: content_type.unwrap_or_default(),
            bytes: bytes.into(),
        });
    }
}

/// Apply a placement control.
#[instrument(skip(session, _current_user))]
pub async fn adjust(
    session: Session,
    RequireAuth(_current_user): RequireAuth,
    Form(form): Form<AdjustForm>,
) -> Result<Response> {
    let action: DesignAction = form
        .action
        .parse()
        .map_err(AppError::BadRequest)?;

    let mut draft = load_draft(&session).await?;
    if draft.artwork.is_none() {
        Notice::error("Please upload a design first")
            .flash(&session)
            .await?;
        return Ok(Redirect::to("/designer").into_response());
    }

    draft.apply(action);
    save_draft(&session, &draft).await?;

    if action == DesignAction::Reset {
        Notice::info("Design position, scale, and rotation reset")
            .flash(&session)
            .await?;
    }
    Ok(Redirect::to("/designer").into_response())
}

/// Update garment and order options.
#[instrument(skip(session, _current_user, form))]
pub async fn options(
    session: Session,
    RequireAuth(_current_user): RequireAuth,
    Form(form): Form<OptionsForm>,
) -> Result<Response> {
    let mut draft = load_draft(&session).await?;

    if let Some(color) = form.color.as_deref() {
        draft.color = color.parse().map_err(AppError::BadRequest)?;
    }
    if let Some(size) = form.size.as_deref() {
        draft.size = size.parse().map_err(AppError::BadRequest)?;
    }
    if let Some(view) = form.view.as_deref() {
        draft.view = view.parse().map_err(AppError::BadRequest)?;
    }
    if let Some(name) = form.name {
        draft.name = name;
    }
    if let Some(description) = form.description {
        draft.description = description;
    }
    if let Some(quantity) = form.quantity.as_deref() {
        // Blank or non-numeric input counts as zero and is caught on save.
        draft.quantity = quantity.trim().parse().unwrap_or(0);
    }

    save_draft(&session, &draft).await?;
    Ok(Redirect::to("/designer").into_response())
}

/// Drop the artwork.
#[instrument(skip(state, session, _current_user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_current_user): RequireAuth,
) -> Result<Response> {
    let mut draft = load_draft(&session).await?;
    if let Some(artwork) = draft.remove_artwork() {
        state.uploads().remove(&artwork).await;
        save_draft(&session, &draft).await?;
        Notice::info("Design removed").flash(&session).await?;
    }
    Ok(Redirect::to("/designer").into_response())
}

/// Save the design as an order and put it in the cart.
///
/// Only one save per user runs at a time. On failure the draft is kept so the
/// shopper can try again; on success it is cleared.
#[instrument(skip(state, session, current_user), fields(user = %current_user.guard_key()))]
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    let draft = load_draft(&session).await?;
    let artwork = match draft.ready_to_save() {
        Ok(artwork) => artwork.clone(),
        Err(e) => {
            Notice::error(e.to_string()).flash(&session).await?;
            return Ok(Redirect::to("/designer").into_response());
        }
    };

    let Some(_permit) = state.saves().try_acquire(&current_user.guard_key()) else {
        Notice::error("A save is already in progress")
            .flash(&session)
            .await?;
        return Ok(Redirect::to("/designer").into_response());
    };

    let Some(stored) = state.uploads().get(&artwork).await else {
        Notice::error("Your uploaded image has expired. Please upload it again.")
            .flash(&session)
            .await?;
        return Ok(Redirect::to("/designer").into_response());
    };

    let unit_price = state.config().designer.unit_price;
    let backend = current_user.backend(state.backend());

    let saved = match save_design(&backend, &draft, &stored, unit_price).await {
        Ok(saved) => saved,
        Err(e) => {
            tracing::warn!(error = %e, step = %e.step, "Design save failed");
            Notice::error(format!("Failed to save design: {e}"))
                .flash(&session)
                .await?;
            return Ok(Redirect::to("/designer").into_response());
        }
    };

    let name = if saved.record.name.trim().is_empty() {
        draft.name.trim().to_owned()
    } else {
        saved.record.name.clone()
    };
    let mut cart = load_cart(&session).await?;
    let added = CartItem::new(saved.tshirt_id, name, unit_price, draft.quantity)
        .and_then(|item| cart.add(item));
    clear_draft(&session).await?;
    state.uploads().remove(&artwork).await;

    let tshirt_id = saved.tshirt_id.to_string();
    add_breadcrumb("designer", "Saved design", Some(&[("tshirt_id", tshirt_id.as_str())]));
    match added {
        Ok(()) => {
            save_cart(&session, &cart).await?;
            Notice::success("Order confirmed successfully!")
                .flash(&session)
                .await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, %tshirt_id, "Saved design not added to cart");
            Notice::error(format!("Design saved, but it could not be added to your cart: {e}"))
                .flash(&session)
                .await?;
        }
    }
    Ok(Redirect::to("/cart").into_response())
}
