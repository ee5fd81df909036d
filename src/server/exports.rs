// Export endpoints - image download and quick share link

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::card::TemplateId;
use crate::export::{copy_link, export_with_notice, generate_link, ImageFormat, QUICK_LINK_COPIED};
use crate::render::render;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub template: Option<String>,
}

/// GET /api/export?format=png|jpg&template=<id>
///
/// Needs a photo on the card. Writes the file into the download directory
/// and also returns the bytes as an attachment.
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = match query.format.as_deref() {
        None => ImageFormat::Png,
        Some(raw) => ImageFormat::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unsupported format: {}", raw)))?,
    };
    let template = query
        .template
        .as_deref()
        .map(TemplateId::parse)
        .unwrap_or_else(|| state.workflow.template());

    let card = state.workflow.card();
    if !card.has_photo() {
        state
            .notifications
            .error("Photo required", "Please upload a profile photo");
        return Err(ApiError::BadRequest(
            "Please upload a profile photo".to_string(),
        ));
    }

    let view = render(&card, template);
    let image = export_with_notice(view, format, state.config.export.scale, &state.notifications)
        .await
        .ok_or_else(|| {
            ApiError::Internal("There was an error generating your social card".to_string())
        })?;

    if let Err(e) = state.downloads.save(&image).await {
        tracing::warn!(
            dir = %state.downloads.dir().display(),
            error = %e,
            "Could not write export to download directory"
        );
    }

    let disposition = format!("attachment; filename=\"{}\"", image.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.mime().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.bytes,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct QuickLinkResponse {
    pub link: String,
    /// False means the link must be shown for manual copying
    pub copied: bool,
}

/// POST /api/export/link
pub async fn quick_link(State(state): State<AppState>) -> Json<QuickLinkResponse> {
    let link = generate_link(&state.config.share.quick_link_base);
    let copied = copy_link(
        state.clipboard.clone(),
        &link,
        &state.notifications,
        QUICK_LINK_COPIED,
    )
    .await;
    Json(QuickLinkResponse { link, copied })
}
