use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;

use crate::{
    models::{LicenseType, MediaType, PlaybackType, SourceId, SourceStatus, WatchSource},
    Error, Result,
};

/// Persistence port for curated sources. Services depend on this trait so the
/// aggregation and flagging logic is testable without a database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchSourceStore: Send + Sync {
    async fn create(&self, source: &WatchSource) -> Result<WatchSource>;

    /// Full-row write of the mutable columns; bumps `updated_at`
    async fn update(&self, source: &WatchSource) -> Result<WatchSource>;

    async fn get_by_id(&self, id: &SourceId) -> Result<Option<WatchSource>>;

    /// Non-removed sources for one media item, oldest first. Flagged sources
    /// are included by policy: flagging degrades trust signaling, not
    /// availability.
    async fn list_by_media(
        &self,
        media_type: MediaType,
        media_id: &str,
    ) -> Result<Vec<WatchSource>>;

    /// Compare-and-swap flagging: transitions the row to `flagged` only if it
    /// is still `active`. Returns whether a transition happened.
    async fn flag_if_active(&self, id: &SourceId) -> Result<bool>;
}

/// Curated source repository for database operations
#[derive(Clone)]
pub struct WatchSourceRepository {
    pool: PgPool,
}

const SOURCE_COLUMNS: &str = "id, media_type, media_id, title, provider, playback_type, url, \
     quality, language, license_type, license_proof_url, region_allowlist, status, \
     created_by, created_at, updated_at";

impl WatchSourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatchSourceStore for WatchSourceRepository {
    async fn create(&self, source: &WatchSource) -> Result<WatchSource> {
        let row = sqlx::query(
            "INSERT INTO watch_sources (id, media_type, media_id, title, provider, playback_type, \
             url, quality, language, license_type, license_proof_url, region_allowlist, status, \
             created_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING id, media_type, media_id, title, provider, playback_type, url, quality, \
             language, license_type, license_proof_url, region_allowlist, status, created_by, \
             created_at, updated_at",
        )
        .bind(&source.id)
        .bind(source.media_type.to_string())
        .bind(&source.media_id)
        .bind(&source.title)
        .bind(&source.provider)
        .bind(source.playback_type.to_string())
        .bind(&source.url)
        .bind(&source.quality)
        .bind(&source.language)
        .bind(source.license_type.to_string())
        .bind(&source.license_proof_url)
        .bind(&source.region_allowlist)
        .bind(source.status.to_string())
        .bind(&source.created_by)
        .bind(source.created_at)
        .bind(source.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row_to_watch_source(row)
    }

    async fn update(&self, source: &WatchSource) -> Result<WatchSource> {
        let row = sqlx::query(
            "UPDATE watch_sources
             SET title = $2, provider = $3, playback_type = $4, url = $5, quality = $6, \
             language = $7, license_type = $8, license_proof_url = $9, region_allowlist = $10, \
             status = $11, updated_at = now()
             WHERE id = $1
             RETURNING id, media_type, media_id, title, provider, playback_type, url, quality, \
             language, license_type, license_proof_url, region_allowlist, status, created_by, \
             created_at, updated_at",
        )
        .bind(&source.id)
        .bind(&source.title)
        .bind(&source.provider)
        .bind(source.playback_type.to_string())
        .bind(&source.url)
        .bind(&source.quality)
        .bind(&source.language)
        .bind(source.license_type.to_string())
        .bind(&source.license_proof_url)
        .bind(&source.region_allowlist)
        .bind(source.status.to_string())
        .fetch_one(&self.pool)
        .await?;

        row_to_watch_source(row)
    }

    async fn get_by_id(&self, id: &SourceId) -> Result<Option<WatchSource>> {
        let row = sqlx::query(&format!(
            "SELECT {SOURCE_COLUMNS} FROM watch_sources WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_watch_source(row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_media(
        &self,
        media_type: MediaType,
        media_id: &str,
    ) -> Result<Vec<WatchSource>> {
        let rows = sqlx::query(&format!(
            "SELECT {SOURCE_COLUMNS} FROM watch_sources
             WHERE media_type = $1 AND media_id = $2 AND status != 'removed'
             ORDER BY created_at ASC"
        ))
        .bind(media_type.to_string())
        .bind(media_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_watch_source).collect()
    }

    async fn flag_if_active(&self, id: &SourceId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE watch_sources
             SET status = 'flagged', updated_at = now()
             WHERE id = $1 AND status = 'active'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert database row to WatchSource
pub(crate) fn row_to_watch_source(row: PgRow) -> Result<WatchSource> {
    let media_type: String = row.try_get("media_type")?;
    let playback_type: String = row.try_get("playback_type")?;
    let license_type: String = row.try_get("license_type")?;
    let status: String = row.try_get("status")?;

    Ok(WatchSource {
        id: row.try_get("id")?,
        media_type: MediaType::from_str(&media_type).map_err(Error::Internal)?,
        media_id: row.try_get("media_id")?,
        title: row.try_get("title")?,
        provider: row.try_get("provider")?,
        playback_type: PlaybackType::from_str(&playback_type).map_err(Error::Internal)?,
        url: row.try_get("url")?,
        quality: row.try_get("quality")?,
        language: row.try_get("language")?,
        license_type: LicenseType::from_str(&license_type).map_err(Error::Internal)?,
        license_proof_url: row.try_get("license_proof_url")?,
        region_allowlist: row.try_get("region_allowlist")?,
        status: SourceStatus::from_str(&status).map_err(Error::Internal)?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
