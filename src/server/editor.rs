// Editor endpoints - form changes, photo intake, submit, preview

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
    Json,
};
use bytes::Bytes;
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};

use super::page;
use super::{ApiError, AppState};
use crate::card::{SocialCardData, TemplateId};
use crate::form::photo::{encode_photo, PhotoError, MAX_PHOTO_BYTES};
use crate::form::{Field, FieldError, FormVariant, SubmitOutcome};
use crate::render::{render, to_html};
use crate::workflow::{LinkState, SaveState, ShareLink};

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub template: Option<String>,
}

/// GET /create?template=<id> - fresh card on the chosen template
pub async fn create_page(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Html<String> {
    let template = query
        .template
        .as_deref()
        .map(TemplateId::parse)
        .unwrap_or(state.config.editor.default_template);

    state.reset_editor(template);
    tracing::debug!(template = %template, "Editor opened");

    let card = state.workflow.card();
    Html(page::editor_page(
        template,
        state.config.editor.form_variant,
        &card,
    ))
}

/// Response for GET /api/editor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub card: SocialCardData,
    pub template: TemplateId,
    pub form_variant: FormVariant,
    pub authenticated: bool,
    pub is_saving: bool,
    pub is_generating_share_link: bool,
    pub save_state: SaveState,
    pub link_state: LinkState,
    pub share_link: Option<ShareLink>,
    pub errors: Vec<FieldError>,
}

/// GET /api/editor
pub async fn get_editor(State(state): State<AppState>) -> Json<EditorState> {
    let (card, form_variant, errors) = {
        let form = state.lock_form();
        (form.snapshot(), form.variant(), form.errors().to_vec())
    };
    let workflow = &state.workflow;

    Json(EditorState {
        card,
        template: workflow.template(),
        form_variant,
        authenticated: state.session.is_authenticated(),
        is_saving: workflow.is_saving(),
        is_generating_share_link: workflow.is_generating_share_link(),
        save_state: workflow.save_state(),
        link_state: workflow.link_state(),
        share_link: workflow.share_link(),
        errors,
    })
}

#[derive(Debug, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub card: SocialCardData,
    pub errors: Vec<FieldError>,
}

/// POST /api/editor/field
pub async fn change_field(
    State(state): State<AppState>,
    Json(change): Json<FieldChange>,
) -> Result<Json<FormResponse>, ApiError> {
    let field: Field = change
        .field
        .parse()
        .map_err(|e: crate::form::UnknownField| ApiError::BadRequest(e.to_string()))?;

    let mut form = state.lock_form();
    let card = form.change(field, change.value);
    Ok(Json(FormResponse {
        card,
        errors: form.errors().to_vec(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub has_photo: bool,
    pub card: SocialCardData,
}

/// Buffer an upload, stopping one byte past the photo limit
async fn read_photo_body(body: Body, headers: &HeaderMap) -> Result<Bytes, PhotoError> {
    match axum::body::to_bytes(body, MAX_PHOTO_BYTES + 1).await {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let inner = e.into_inner();
            if inner.downcast_ref::<LengthLimitError>().is_some() {
                let size = headers
                    .get(header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(MAX_PHOTO_BYTES + 1);
                Err(PhotoError::TooLarge { size })
            } else {
                Err(PhotoError::Read(std::io::Error::other(inner)))
            }
        }
    }
}

/// POST /api/editor/photo - raw image body
pub async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<PhotoResponse>, ApiError> {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let encoded = match read_photo_body(body, &headers).await {
        Ok(bytes) => encode_photo(&bytes, declared).map(|uri| (uri, bytes.len())),
        Err(e) => Err(e),
    };

    let (data_uri, size) = match encoded {
        Ok(encoded) => encoded,
        Err(e) => {
            e.notify(&state.notifications);
            return Err(match &e {
                PhotoError::TooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
                PhotoError::NotAnImage | PhotoError::Read(_) => {
                    ApiError::BadRequest(e.to_string())
                }
            });
        }
    };

    tracing::debug!(bytes = size, "Photo attached");
    let mut form = state.lock_form();
    let card = form.attach_photo(data_uri);
    Ok(Json(PhotoResponse {
        has_photo: form.has_photo(),
        card,
    }))
}

/// POST /api/editor/submit
pub async fn submit(State(state): State<AppState>) -> Result<Json<FormResponse>, ApiError> {
    let outcome = state.lock_form().submit();

    match outcome {
        SubmitOutcome::Accepted(card) => Ok(Json(FormResponse {
            card,
            errors: Vec::new(),
        })),
        SubmitOutcome::Invalid(errors) => Err(ApiError::Unprocessable(
            "validation failed".to_string(),
            errors,
        )),
        SubmitOutcome::PhotoMissing => {
            Err(ApiError::BadRequest("Please upload a profile photo".to_string()))
        }
    }
}

/// GET /api/preview?template=<id> - HTML fragment for the current card
pub async fn preview(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> impl IntoResponse {
    let template = query
        .template
        .as_deref()
        .map(TemplateId::parse)
        .unwrap_or_else(|| state.workflow.template());

    Html(to_html(&render(&state.workflow.card(), template)))
}
