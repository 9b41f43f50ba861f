//! Watch-source HTTP API
//!
//! Resolution of playable sources plus the operator surface for curated
//! entries and the public report intake.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::str::FromStr;

use cinelink_core::models::{LicenseType, MediaType, PlaybackType, SourceId, SourceStatus};
use cinelink_core::service::{CreateSourceParams, ResolveRequest, UpdateSourceParams};

use crate::http::{middleware::OperatorUser, AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQuery {
    pub region: Option<String>,
    pub imdb_id: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Resolve all playable sources for a media item (public).
///
/// Producer degradation never turns into a 5xx here; an empty tier is a valid
/// answer and `partial` carries the degradation signal.
pub async fn get_sources_by_media(
    State(state): State<AppState>,
    Path((media_type, media_id)): Path<(String, String)>,
    Query(query): Query<ResolveQuery>,
) -> AppResult<impl IntoResponse> {
    let media_type = MediaType::from_str(&media_type).map_err(AppError::bad_request)?;

    let resolved = state
        .resolver
        .resolve(&ResolveRequest {
            media_type,
            media_id,
            region: query.region,
            imdb_id: query.imdb_id,
            season: query.season,
            episode: query.episode,
        })
        .await;

    Ok(Json(resolved))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourceRequest {
    pub media_type: String,
    pub media_id: String,
    pub title: String,
    pub provider: String,
    #[serde(default)]
    pub playback_type: Option<String>,
    pub url: String,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license_type: Option<String>,
    #[serde(default)]
    pub license_proof_url: Option<String>,
    #[serde(default)]
    pub region_allowlist: Option<Vec<String>>,
}

/// Create a curated source (operator only)
pub async fn create_source(
    State(state): State<AppState>,
    OperatorUser(actor): OperatorUser,
    Json(req): Json<CreateSourceRequest>,
) -> AppResult<impl IntoResponse> {
    let media_type = MediaType::from_str(&req.media_type).map_err(AppError::bad_request)?;
    let playback_type = parse_optional(req.playback_type.as_deref(), PlaybackType::from_str)?;
    let license_type = parse_optional(req.license_type.as_deref(), LicenseType::from_str)?;

    let created = state
        .source_service
        .create_source(
            &actor,
            CreateSourceParams {
                media_type,
                media_id: req.media_id,
                title: req.title,
                provider: req.provider,
                playback_type,
                url: req.url,
                quality: req.quality,
                language: req.language,
                license_type,
                license_proof_url: req.license_proof_url,
                region_allowlist: req.region_allowlist.unwrap_or_default(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSourceRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub playback_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license_type: Option<String>,
    #[serde(default)]
    pub license_proof_url: Option<String>,
    #[serde(default)]
    pub region_allowlist: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Update any subset of a curated source's mutable fields (operator only)
pub async fn update_source(
    State(state): State<AppState>,
    OperatorUser(actor): OperatorUser,
    Path(source_id): Path<String>,
    Json(req): Json<UpdateSourceRequest>,
) -> AppResult<impl IntoResponse> {
    let source_id = SourceId::from_string(source_id);

    let params = UpdateSourceParams {
        title: req.title,
        provider: req.provider,
        playback_type: parse_optional(req.playback_type.as_deref(), PlaybackType::from_str)?,
        url: req.url,
        quality: req.quality,
        language: req.language,
        license_type: parse_optional(req.license_type.as_deref(), LicenseType::from_str)?,
        license_proof_url: req.license_proof_url,
        region_allowlist: req.region_allowlist,
        status: parse_optional(req.status.as_deref(), SourceStatus::from_str)?,
    };

    let updated = state
        .source_service
        .update_source(&actor, &source_id, params)
        .await?;

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub reason: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// File a report against a curated source (public, anonymous allowed)
pub async fn create_report(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<impl IntoResponse> {
    let source_id = SourceId::from_string(source_id);

    let report = state
        .report_service
        .file_report(&source_id, &req.reason, req.email.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// List open reports with their sources (operator only)
pub async fn get_open_reports(
    State(state): State<AppState>,
    OperatorUser(actor): OperatorUser,
) -> AppResult<impl IntoResponse> {
    let reports = state.source_service.list_open_reports(&actor).await?;
    Ok(Json(reports))
}

fn parse_optional<T, E: ToString>(
    value: Option<&str>,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, AppError> {
    value
        .map(|raw| parse(raw).map_err(|e| AppError::bad_request(e.to_string())))
        .transpose()
}
