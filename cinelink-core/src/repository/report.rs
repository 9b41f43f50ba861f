use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;

use crate::{
    models::{
        LicenseType, MediaType, PlaybackType, Report, ReportStatus, ReportWithSource,
        SourceStatus, WatchSource,
    },
    Error, Result,
};

/// Persistence port for source reports
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create(&self, report: &Report) -> Result<Report>;

    /// Open reports, newest first, joined with the source they target
    async fn list_open_with_source(&self) -> Result<Vec<ReportWithSource>>;
}

/// Report repository for database operations
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for ReportRepository {
    async fn create(&self, report: &Report) -> Result<Report> {
        let row = sqlx::query(
            "INSERT INTO watch_source_reports (id, source_id, reason, email, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, source_id, reason, email, status, created_at",
        )
        .bind(&report.id)
        .bind(&report.source_id)
        .bind(&report.reason)
        .bind(&report.email)
        .bind(report.status.to_string())
        .bind(report.created_at)
        .fetch_one(&self.pool)
        .await?;

        row_to_report(&row)
    }

    async fn list_open_with_source(&self) -> Result<Vec<ReportWithSource>> {
        let rows = sqlx::query(
            "SELECT r.id, r.source_id, r.reason, r.email, r.status, r.created_at, \
             s.id AS s_id, s.media_type AS s_media_type, s.media_id AS s_media_id, \
             s.title AS s_title, s.provider AS s_provider, s.playback_type AS s_playback_type, \
             s.url AS s_url, s.quality AS s_quality, s.language AS s_language, \
             s.license_type AS s_license_type, s.license_proof_url AS s_license_proof_url, \
             s.region_allowlist AS s_region_allowlist, s.status AS s_status, \
             s.created_by AS s_created_by, s.created_at AS s_created_at, \
             s.updated_at AS s_updated_at
             FROM watch_source_reports r
             JOIN watch_sources s ON s.id = r.source_id
             WHERE r.status = 'open'
             ORDER BY r.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ReportWithSource {
                    report: row_to_report(&row)?,
                    source: row_to_joined_source(&row)?,
                })
            })
            .collect()
    }

}

/// Convert database row to Report
fn row_to_report(row: &PgRow) -> Result<Report> {
    let status: String = row.try_get("status")?;

    Ok(Report {
        id: row.try_get("id")?,
        source_id: row.try_get("source_id")?,
        reason: row.try_get("reason")?,
        email: row.try_get("email")?,
        status: ReportStatus::from_str(&status).map_err(Error::Internal)?,
        created_at: row.try_get("created_at")?,
    })
}

/// Convert the `s_`-prefixed half of a joined row to WatchSource
fn row_to_joined_source(row: &PgRow) -> Result<WatchSource> {
    let media_type: String = row.try_get("s_media_type")?;
    let playback_type: String = row.try_get("s_playback_type")?;
    let license_type: String = row.try_get("s_license_type")?;
    let status: String = row.try_get("s_status")?;

    Ok(WatchSource {
        id: row.try_get("s_id")?,
        media_type: MediaType::from_str(&media_type).map_err(Error::Internal)?,
        media_id: row.try_get("s_media_id")?,
        title: row.try_get("s_title")?,
        provider: row.try_get("s_provider")?,
        playback_type: PlaybackType::from_str(&playback_type).map_err(Error::Internal)?,
        url: row.try_get("s_url")?,
        quality: row.try_get("s_quality")?,
        language: row.try_get("s_language")?,
        license_type: LicenseType::from_str(&license_type).map_err(Error::Internal)?,
        license_proof_url: row.try_get("s_license_proof_url")?,
        region_allowlist: row.try_get("s_region_allowlist")?,
        status: SourceStatus::from_str(&status).map_err(Error::Internal)?,
        created_by: row.try_get("s_created_by")?,
        created_at: row.try_get("s_created_at")?,
        updated_at: row.try_get("s_updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_create_report() {
        // Integration test placeholder
    }
}
