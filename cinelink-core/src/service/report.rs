//! Report intake and automatic flagging.
//!
//! Filing a report against an active curated source flags it in the same
//! logical operation. The transition is a compare-and-swap at the persistence
//! boundary, so concurrent reports cannot double-trigger it.

use std::sync::Arc;

use crate::models::{Report, SourceId};
use crate::repository::{ReportStore, WatchSourceStore};
use crate::validation::{EmailValidator, ReasonValidator};
use crate::{Error, Result};

pub struct ReportService {
    sources: Arc<dyn WatchSourceStore>,
    reports: Arc<dyn ReportStore>,
}

impl ReportService {
    pub fn new(sources: Arc<dyn WatchSourceStore>, reports: Arc<dyn ReportStore>) -> Self {
        Self { sources, reports }
    }

    /// File a report against a curated source. Anonymous reporters allowed.
    pub async fn file_report(
        &self,
        source_id: &SourceId,
        reason: &str,
        email: Option<&str>,
    ) -> Result<Report> {
        let reason = reason.trim();
        ReasonValidator::new().validate(reason)?;

        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => {
                EmailValidator::new().validate(email)?;
                Some(email.to_string())
            }
            None => None,
        };

        self.sources
            .get_by_id(source_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Source {source_id} not found")))?;

        let report = Report::new(source_id.clone(), reason.to_string(), email);
        let report = self.reports.create(&report).await?;

        // First report on an active source flags it; the CAS no-ops for
        // already-flagged or removed sources. The report row is the primary
        // effect, so a flagging failure is logged rather than surfaced.
        match self.sources.flag_if_active(source_id).await {
            Ok(true) => {
                tracing::info!(%source_id, report_id = %report.id, "source flagged after report");
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(%source_id, error = %e, "failed to flag reported source");
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        LicenseType, MediaType, NewWatchSource, PlaybackType, SourceStatus, WatchSource,
    };
    use crate::repository::{MockReportStore, MockWatchSourceStore};

    fn stored_source(status: SourceStatus) -> WatchSource {
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
            created_by: "ops".to_string(),
        });
        source.status = status;
        source
    }

    #[tokio::test]
    async fn test_short_reason_rejected_before_any_store_call() {
        let service = ReportService::new(
            Arc::new(MockWatchSourceStore::new()),
            Arc::new(MockReportStore::new()),
        );

        let err = service
            .file_report(&SourceId::new(), "bad", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_malformed_email_rejected() {
        let service = ReportService::new(
            Arc::new(MockWatchSourceStore::new()),
            Arc::new(MockReportStore::new()),
        );

        let err = service
            .file_report(&SourceId::new(), "stream is broken", Some("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_source_is_not_found() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_get_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = ReportService::new(Arc::new(sources), Arc::new(MockReportStore::new()));
        let err = service
            .file_report(&SourceId::new(), "stream is broken", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_first_report_flags_active_source() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_get_by_id()
            .times(1)
            .returning(|_| Ok(Some(stored_source(SourceStatus::Active))));
        sources
            .expect_flag_if_active()
            .times(1)
            .returning(|_| Ok(true));

        let mut reports = MockReportStore::new();
        reports
            .expect_create()
            .withf(|report: &Report| report.reason == "stream is broken")
            .times(1)
            .returning(|report| Ok(report.clone()));

        let service = ReportService::new(Arc::new(sources), Arc::new(reports));
        let report = service
            .file_report(&SourceId::new(), "  stream is broken  ", None)
            .await
            .unwrap();
        assert_eq!(report.reason, "stream is broken");
    }

    #[tokio::test]
    async fn test_second_report_recorded_without_retrigger() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_get_by_id()
            .times(1)
            .returning(|_| Ok(Some(stored_source(SourceStatus::Flagged))));
        // CAS no-ops for an already-flagged source
        sources
            .expect_flag_if_active()
            .times(1)
            .returning(|_| Ok(false));

        let mut reports = MockReportStore::new();
        reports
            .expect_create()
            .times(1)
            .returning(|report| Ok(report.clone()));

        let service = ReportService::new(Arc::new(sources), Arc::new(reports));
        let report = service
            .file_report(&SourceId::new(), "still broken", Some("user@example.com"))
            .await
            .unwrap();
        assert_eq!(report.email.as_deref(), Some("user@example.com"));
    }

    #[tokio::test]
    async fn test_flagging_failure_does_not_fail_the_report() {
        let mut sources = MockWatchSourceStore::new();
        sources
            .expect_get_by_id()
            .times(1)
            .returning(|_| Ok(Some(stored_source(SourceStatus::Active))));
        sources
            .expect_flag_if_active()
            .times(1)
            .returning(|_| Err(Error::Internal("connection lost".to_string())));

        let mut reports = MockReportStore::new();
        reports
            .expect_create()
            .times(1)
            .returning(|report| Ok(report.clone()));

        let service = ReportService::new(Arc::new(sources), Arc::new(reports));
        assert!(service
            .file_report(&SourceId::new(), "stream is broken", None)
            .await
            .is_ok());
    }
}
