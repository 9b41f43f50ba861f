//! Curated-source management: operator CRUD with license and status rules.

use std::sync::Arc;

use crate::models::{
    LicenseType, MediaType, NewWatchSource, PlaybackType, ReportWithSource, SourceId,
    SourceStatus, User, WatchSource,
};
use crate::repository::{ReportStore, WatchSourceStore};
use crate::validation::{normalize_region_allowlist, UrlValidator, TITLE_MAX};
use crate::{Error, Result};

/// Parameters for creating a curated source.
///
/// `license_type` is optional here so a missing classification surfaces as a
/// validation failure (nothing persisted) rather than a decode error.
#[derive(Debug, Clone)]
pub struct CreateSourceParams {
    pub media_type: MediaType,
    pub media_id: String,
    pub title: String,
    pub provider: String,
    pub playback_type: Option<PlaybackType>,
    pub url: String,
    pub quality: Option<String>,
    pub language: Option<String>,
    pub license_type: Option<LicenseType>,
    pub license_proof_url: Option<String>,
    pub region_allowlist: Vec<String>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateSourceParams {
    pub title: Option<String>,
    pub provider: Option<String>,
    pub playback_type: Option<PlaybackType>,
    pub url: Option<String>,
    pub quality: Option<String>,
    pub language: Option<String>,
    pub license_type: Option<LicenseType>,
    pub license_proof_url: Option<String>,
    pub region_allowlist: Option<Vec<String>>,
    pub status: Option<SourceStatus>,
}

pub struct SourceService {
    sources: Arc<dyn WatchSourceStore>,
    reports: Arc<dyn ReportStore>,
}

impl SourceService {
    pub fn new(sources: Arc<dyn WatchSourceStore>, reports: Arc<dyn ReportStore>) -> Self {
        Self { sources, reports }
    }

    pub async fn create_source(
        &self,
        actor: &User,
        params: CreateSourceParams,
    ) -> Result<WatchSource> {
        require_operator(actor)?;

        // A source without a license classification is never accepted
        let license_type = params
            .license_type
            .ok_or_else(|| Error::InvalidInput("licenseType is required".to_string()))?;

        let title = non_empty("title", &params.title)?;
        let provider = non_empty("provider", &params.provider)?;
        let media_id = non_empty("mediaId", &params.media_id)?;

        let url_validator = UrlValidator::new();
        url_validator.validate("url", &params.url)?;
        if let Some(proof) = &params.license_proof_url {
            url_validator.validate("licenseProofUrl", proof)?;
        }

        let region_allowlist = normalize_region_allowlist(&params.region_allowlist)?;

        let record = WatchSource::new(NewWatchSource {
            media_type: params.media_type,
            media_id,
            title,
            provider,
            playback_type: params.playback_type.unwrap_or(PlaybackType::External),
            url: params.url,
            quality: params.quality.unwrap_or_else(|| "unknown".to_string()),
            language: params.language.unwrap_or_else(|| "und".to_string()),
            license_type,
            license_proof_url: params.license_proof_url,
            region_allowlist,
            created_by: actor.username.clone(),
        });

        let created = self.sources.create(&record).await?;
        tracing::info!(source_id = %created.id, media_id = %created.media_id, "curated source created");
        Ok(created)
    }

    pub async fn update_source(
        &self,
        actor: &User,
        id: &SourceId,
        params: UpdateSourceParams,
    ) -> Result<WatchSource> {
        require_operator(actor)?;

        let mut source = self
            .sources
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Source {id} not found")))?;

        if let Some(status) = params.status {
            if status != source.status && !source.status.can_transition_to(status) {
                return Err(Error::InvalidInput(format!(
                    "Cannot move source from {} to {}",
                    source.status, status
                )));
            }
            source.status = status;
        }

        let url_validator = UrlValidator::new();
        if let Some(url) = params.url {
            url_validator.validate("url", &url)?;
            source.url = url;
        }
        if let Some(proof) = params.license_proof_url {
            url_validator.validate("licenseProofUrl", &proof)?;
            source.license_proof_url = Some(proof);
        }
        if let Some(title) = params.title {
            source.title = non_empty("title", &title)?;
        }
        if let Some(provider) = params.provider {
            source.provider = non_empty("provider", &provider)?;
        }
        if let Some(playback_type) = params.playback_type {
            source.playback_type = playback_type;
        }
        if let Some(quality) = params.quality {
            source.quality = quality;
        }
        if let Some(language) = params.language {
            source.language = language;
        }
        if let Some(license_type) = params.license_type {
            source.license_type = license_type;
        }
        if let Some(regions) = params.region_allowlist {
            source.region_allowlist = normalize_region_allowlist(&regions)?;
        }

        let updated = self.sources.update(&source).await?;
        tracing::info!(source_id = %updated.id, status = %updated.status, "curated source updated");
        Ok(updated)
    }

    /// Moderation surface: open reports joined with their sources
    pub async fn list_open_reports(&self, actor: &User) -> Result<Vec<ReportWithSource>> {
        require_operator(actor)?;
        self.reports.list_open_with_source().await
    }
}

fn require_operator(actor: &User) -> Result<()> {
    if actor.role.is_operator() {
        Ok(())
    } else {
        Err(Error::Unauthorized("Operator role required".to_string()))
    }
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{field} can not be empty")));
    }
    if trimmed.len() > TITLE_MAX {
        return Err(Error::InvalidInput(format!("{field} is too long")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use crate::repository::{MockReportStore, MockWatchSourceStore};

    fn operator() -> User {
        User {
            id: UserId::new(),
            username: "ops@example.com".to_string(),
            display_name: "Ops".to_string(),
            role: crate::models::UserRole::Operator,
        }
    }

    fn viewer() -> User {
        User {
            id: UserId::new(),
            username: "viewer".to_string(),
            display_name: "Viewer".to_string(),
            role: crate::models::UserRole::User,
        }
    }

    fn create_params() -> CreateSourceParams {
        CreateSourceParams {
            media_type: MediaType::Movie,
            media_id: "27205".to_string(),
            title: "Inception".to_string(),
            provider: "Archive".to_string(),
            playback_type: Some(PlaybackType::Hls),
            url: "https://example.com/master.m3u8".to_string(),
            quality: None,
            language: None,
            license_type: Some(LicenseType::PublicDomain),
            license_proof_url: None,
            region_allowlist: vec!["us".to_string()],
        }
    }

    fn service_with(
        sources: MockWatchSourceStore,
        reports: MockReportStore,
    ) -> SourceService {
        SourceService::new(Arc::new(sources), Arc::new(reports))
    }

    fn existing_source(status: SourceStatus) -> WatchSource {
        let mut source = WatchSource::new(NewWatchSource {
            media_type: MediaType::Movie,
            media_id: "27205".to_string(),
            title: "Inception".to_string(),
            provider: "Archive".to_string(),
            playback_type: PlaybackType::External,
            url: "https://example.com/watch".to_string(),
            quality: "unknown".to_string(),
            language: "und".to_string(),
            license_type: LicenseType::Other,
            license_proof_url: None,
            region_allowlist: Vec::new(),
            created_by: "ops@example.com".to_string(),
        });
        source.status = status;
        source
    }

    #[tokio::test]
    async fn test_create_requires_license() {
        // Store must never be touched when validation fails
        let service = service_with(MockWatchSourceStore::new(), MockReportStore::new());

        let mut params = create_params();
        params.license_type = None;

        let err = service.create_source(&operator(), params).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("licenseType")));
    }

    #[tokio::test]
    async fn test_create_requires_operator() {
        let service = service_with(MockWatchSourceStore::new(), MockReportStore::new());

        let err = service
            .create_source(&viewer(), create_params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_url() {
        let service = service_with(MockWatchSourceStore::new(), MockReportStore::new());

        let mut params = create_params();
        params.url = "magnet:?xt=urn:btih:abc".to_string();

        let err = service.create_source(&operator(), params).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_persists_with_defaults() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_create()
            .withf(|record: &WatchSource| {
                record.status == SourceStatus::Active
                    && record.quality == "unknown"
                    && record.language == "und"
                    && record.region_allowlist == vec!["US".to_string()]
                    && record.created_by == "ops@example.com"
            })
            .times(1)
            .returning(|record| Ok(record.clone()));

        let service = service_with(sources, MockReportStore::new());
        let mut params = create_params();
        params.quality = None;

        let created = service.create_source(&operator(), params).await.unwrap();
        assert_eq!(created.license_type, LicenseType::PublicDomain);
    }

    #[tokio::test]
    async fn test_update_missing_source_is_not_found() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_get_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service_with(sources, MockReportStore::new());
        let err = service
            .update_source(&operator(), &SourceId::new(), UpdateSourceParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_removed_to_active() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_get_by_id()
            .times(1)
            .returning(|_| Ok(Some(existing_source(SourceStatus::Removed))));

        let service = service_with(sources, MockReportStore::new());
        let params = UpdateSourceParams {
            status: Some(SourceStatus::Active),
            ..Default::default()
        };

        let err = service
            .update_source(&operator(), &SourceId::new(), params)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_restores_flagged_source() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_get_by_id()
            .times(1)
            .returning(|_| Ok(Some(existing_source(SourceStatus::Flagged))));
        sources
            .expect_update()
            .withf(|source: &WatchSource| source.status == SourceStatus::Active)
            .times(1)
            .returning(|source| Ok(source.clone()));

        let service = service_with(sources, MockReportStore::new());
        let params = UpdateSourceParams {
            status: Some(SourceStatus::Active),
            ..Default::default()
        };

        let updated = service
            .update_source(&operator(), &SourceId::new(), params)
            .await
            .unwrap();
        assert_eq!(updated.status, SourceStatus::Active);
    }

    #[tokio::test]
    async fn test_list_open_reports_requires_operator() {
        let service = service_with(MockWatchSourceStore::new(), MockReportStore::new());
        let err = service.list_open_reports(&viewer()).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
