use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{db::models::LabelInput, error::AppError, web::page, AppState};

/// Number of codes shown on the listing page.
pub const INDEX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    const OK: Self = Self { status: "ok" };
    const HEALTHY: Self = Self { status: "healthy" };
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::validation("Invalid ID"))
}

/// Decodes the first JSON value of a label body. `null` clears the label and
/// anything after the value is ignored.
fn parse_label_body(body: &[u8]) -> Result<String, AppError> {
    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<Option<LabelInput>>();
    match stream.next() {
        Some(Ok(input)) => Ok(input.unwrap_or_default().label),
        _ => Err(AppError::validation("Invalid JSON")),
    }
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let qr_codes = state.db.list_qr_codes(INDEX_PAGE_LIMIT, 0).await?;
    let total = state.db.count_qr_codes().await?;
    Ok(Html(page::render_index(&qr_codes, total)))
}

/// `content` comes from the form body, falling back to the query string.
pub async fn generate(
    State(state): State<AppState>,
    query: Result<Query<GenerateForm>, QueryRejection>,
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let form = match form {
        Ok(Form(form)) => form,
        // A non-form body carries no fields.
        Err(FormRejection::InvalidFormContentType(_)) => GenerateForm::default(),
        Err(err) => {
            debug!("Rejected generate form: {err}");
            return Err(AppError::validation("Invalid form data"));
        }
    };
    let Query(query) = query.map_err(|err| {
        debug!("Rejected generate query: {err}");
        AppError::validation("Invalid form data")
    })?;

    let raw_content = form.content.or(query.content).unwrap_or_default();
    let content = raw_content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::validation("Content is required"));
    }

    // Encoding is CPU-bound; keep it off the async workers.
    let generator = state.generator.clone();
    let to_encode = content.clone();
    let image_data = tokio::task::spawn_blocking(move || generator.generate(&to_encode))
        .await
        .context("qr encoding task panicked")??;

    let qr_code = state
        .db
        .create_qr_code(content, String::new(), image_data)
        .await?;
    info!("Generated qr code {}", qr_code.id);

    Ok(Redirect::to("/"))
}

pub async fn get_qr_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let qr_code = state
        .db
        .get_qr_code(id)
        .await?
        .ok_or(AppError::NotFound(id))?;

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"qr-{id}.png\""),
        ),
    ];
    Ok((headers, qr_code.image_data))
}

/// Body is parsed by hand so clients that omit `Content-Type` still work.
pub async fn update_label(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<StatusResponse>, AppError> {
    let id = parse_id(&id)?;
    let label = parse_label_body(&body)?;

    state.db.update_qr_code_label(id, label).await?;
    info!("Updated label of qr code {id}");

    Ok(Json(StatusResponse::OK))
}

pub async fn delete_qr_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = parse_id(&id)?;
    state.db.delete_qr_code(id).await?;
    info!("Deleted qr code {id}");

    Ok(Json(StatusResponse::OK))
}

pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::HEALTHY)
}
