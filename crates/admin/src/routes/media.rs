//! Media library route handlers.
//!
//! Uploads arrive as multipart form data and are forwarded to the backend
//! base64-encoded.

use askama::Template;
use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use tracing::instrument;

use showroom_core::{MediaAsset, MediaAssetId, MediaInput};

use crate::{
    components::{DataTableConfig, ListQuery, data_table::media_table_config},
    filters,
    middleware::RequireAdmin,
    services::Flash,
    state::AppState,
};

use super::{dashboard::AdminUserView, date_label, done, load, render, settle};

const LIST_PATH: &str = "/admin/media";

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types the library accepts.
const ACCEPTED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "application/pdf",
];

/// Media view for the library page.
#[derive(Debug, Clone)]
pub struct MediaRow {
    pub id: MediaAssetId,
    pub file_name: String,
    pub url: String,
    pub is_image: bool,
    pub size: String,
    pub alt_text: String,
    pub uploaded: String,
}

impl From<&MediaAsset> for MediaRow {
    fn from(asset: &MediaAsset) -> Self {
        Self {
            id: asset.id,
            file_name: asset.file_name.clone(),
            url: asset.url.clone(),
            is_image: asset.is_image(),
            size: asset.human_size(),
            alt_text: asset.alt_text.clone(),
            uploaded: date_label(asset.uploaded_at),
        }
    }
}

/// Alt text edit form.
#[derive(Debug, Deserialize)]
pub struct AltTextForm {
    #[serde(default)]
    pub alt_text: String,
}

/// Media library template.
#[derive(Template)]
#[template(path = "media/index.html")]
pub struct MediaIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub table: DataTableConfig,
    pub query: ListQuery,
    pub assets: Vec<MediaRow>,
    pub accepted: String,
    pub error: Option<String>,
}

/// Build the media router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/media",
            get(index)
                .post(upload)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/admin/media/{id}", post(update_alt_text))
        .route("/admin/media/{id}/delete", post(delete))
}

/// Build the upload payload from the received file.
///
/// # Errors
///
/// Returns a message when the file is missing, empty, too large or of an
/// unsupported type.
pub fn upload_input(
    file_name: &str,
    content_type: &str,
    data: &[u8],
    alt_text: &str,
) -> Result<MediaInput, String> {
    let file_name = file_name.trim();
    if file_name.is_empty() || data.is_empty() {
        return Err("Choose a file to upload.".to_string());
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(format!(
            "Files must be at most {} MB.",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ));
    }
    if !ACCEPTED_TYPES.contains(&content_type) {
        return Err(format!("Unsupported file type: {content_type}."));
    }

    Ok(MediaInput {
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
        alt_text: alt_text.trim().to_string(),
        data_base64: Some(STANDARD.encode(data)),
    })
}

/// Read the `file` and `alt_text` parts of an upload form.
async fn read_upload(mut multipart: Multipart) -> Result<MediaInput, String> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut alt_text = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Upload failed: {e}"))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Upload failed: {e}"))?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            Some("alt_text") => {
                alt_text = field
                    .text()
                    .await
                    .map_err(|e| format!("Upload failed: {e}"))?;
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) = file.unwrap_or_default();
    upload_input(&file_name, &content_type, &data, &alt_text)
}

fn filter_assets(assets: &[MediaAsset], query: &ListQuery) -> Vec<MediaRow> {
    let needle = query.needle();
    assets
        .iter()
        .filter(|a| {
            needle.is_empty()
                || a.file_name.to_lowercase().contains(&needle)
                || a.alt_text.to_lowercase().contains(&needle)
        })
        .map(MediaRow::from)
        .collect()
}

/// Media library page handler.
///
/// GET /admin/media
#[instrument(skip(ctx, state))]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    let (assets, error) = load(&ctx, ctx.queries(&state).list::<MediaAsset>().await).await?;

    let template = MediaIndexTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        table: media_table_config(),
        assets: filter_assets(&assets, &query),
        accepted: ACCEPTED_TYPES.join(","),
        query,
        error,
    };

    Ok(render(&template))
}

/// Upload a file.
///
/// POST /admin/media
#[instrument(skip_all)]
pub async fn upload(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let input = match read_upload(multipart).await {
        Ok(input) => input,
        Err(message) => {
            tracing::warn!(%message, "Media upload rejected");
            Flash::error(message).push(ctx.store.session()).await;
            return Ok(Redirect::to(LIST_PATH).into_response());
        }
    };

    let asset = settle(&ctx, ctx.queries(&state).create::<MediaAsset>(&input).await, LIST_PATH)
        .await?;
    tracing::info!(media_id = %asset.id, file_name = %asset.file_name, "Media uploaded");
    Ok(done(&ctx, "File uploaded.", LIST_PATH).await)
}

/// Change an asset's alt text.
///
/// POST /admin/media/{id}
#[instrument(skip(ctx, state, form))]
pub async fn update_alt_text(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<MediaAssetId>,
    Form(form): Form<AltTextForm>,
) -> Result<Response, Response> {
    let queries = ctx.queries(&state);
    let asset = settle(&ctx, queries.get::<MediaAsset>(id).await, LIST_PATH).await?;

    let input = MediaInput {
        file_name: asset.file_name,
        content_type: asset.content_type,
        alt_text: form.alt_text.trim().to_string(),
        data_base64: None,
    };
    settle(&ctx, queries.update::<MediaAsset>(id, &input).await, LIST_PATH).await?;

    tracing::info!(media_id = %id, "Media alt text updated");
    Ok(done(&ctx, "Alt text saved.", LIST_PATH).await)
}

/// POST /admin/media/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<MediaAssetId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).delete::<MediaAsset>(id).await, LIST_PATH).await?;
    tracing::info!(media_id = %id, "Media deleted");
    Ok(done(&ctx, "File deleted.", LIST_PATH).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_input_encodes_contents() {
        let input = upload_input(" front.png ", "image/png", b"png-bytes", " Front view ").unwrap();
        assert_eq!(input.file_name, "front.png");
        assert_eq!(input.alt_text, "Front view");
        assert_eq!(input.data_base64.as_deref(), Some("cG5nLWJ5dGVz"));
    }

    #[test]
    fn test_upload_input_rejections() {
        assert_eq!(
            upload_input("", "image/png", b"x", "").unwrap_err(),
            "Choose a file to upload."
        );
        assert_eq!(
            upload_input("a.png", "image/png", b"", "").unwrap_err(),
            "Choose a file to upload."
        );
        assert_eq!(
            upload_input("a.exe", "application/x-msdownload", b"x", "").unwrap_err(),
            "Unsupported file type: application/x-msdownload."
        );
        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert_eq!(
            upload_input("a.png", "image/png", &big, "").unwrap_err(),
            "Files must be at most 10 MB."
        );
    }
}
