//! Source aggregation: fan out to the three producers, normalize, filter,
//! and return a tier-ordered composite.
//!
//! Each resolve invocation is independent and stateless. The embed producer
//! is pure, the torrent producer swallows its own failures, so only the
//! curated lookup can degrade — and degradation is reported through the
//! `partial` flag instead of failing the aggregate.

use std::sync::Arc;

use serde::Serialize;

use crate::models::{MediaType, Source, WatchSource};
use crate::provider::embed::build_embed_sources;
use crate::provider::torrent::TorrentIndex;
use crate::repository::WatchSourceStore;
use crate::Result;

/// One aggregation request
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub media_type: MediaType,
    pub media_id: String,
    pub region: Option<String>,
    pub imdb_id: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Aggregation result. Tiers are kept separate so clients can label
/// provenance; `partial` signals that a producer degraded and some sources
/// may be missing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSources {
    pub db_sources: Vec<Source>,
    pub embed_sources: Vec<Source>,
    pub torrent_sources: Vec<Source>,
    pub partial: bool,
}

impl ResolvedSources {
    /// Flatten in tier order (curated, embed, torrent), stable inside each
    /// tier. No re-sort by quality: the labels are unverified.
    #[must_use]
    pub fn into_playlist(self) -> Vec<Source> {
        let mut sources = self.db_sources;
        sources.extend(self.embed_sources);
        sources.extend(self.torrent_sources);
        sources
    }
}

pub struct SourceResolver {
    sources: Arc<dyn WatchSourceStore>,
    torrent_index: Arc<dyn TorrentIndex>,
}

impl SourceResolver {
    pub fn new(sources: Arc<dyn WatchSourceStore>, torrent_index: Arc<dyn TorrentIndex>) -> Self {
        Self {
            sources,
            torrent_index,
        }
    }

    /// Resolve all playable sources for one media item.
    ///
    /// The three producers run concurrently and the call completes only when
    /// all of them have settled.
    pub async fn resolve(&self, request: &ResolveRequest) -> ResolvedSources {
        let curated = self.curated_tier(request);
        let embed = async {
            build_embed_sources(
                request.media_type,
                &request.media_id,
                request.season,
                request.episode,
            )
        };
        let torrent = self.torrent_tier(request);

        let (curated, embed_sources, torrent_sources) = tokio::join!(curated, embed, torrent);

        let (db_sources, partial) = match curated {
            Ok(sources) => (sources, false),
            Err(e) => {
                tracing::error!(
                    media_type = %request.media_type,
                    media_id = %request.media_id,
                    error = %e,
                    "curated source lookup failed; returning partial aggregate"
                );
                (Vec::new(), true)
            }
        };

        ResolvedSources {
            db_sources,
            embed_sources,
            torrent_sources,
            partial,
        }
    }

    async fn curated_tier(&self, request: &ResolveRequest) -> Result<Vec<Source>> {
        let records = self
            .sources
            .list_by_media(request.media_type, &request.media_id)
            .await?;

        // Region gate applies to the curated tier only; embed and torrent
        // sources are provider-global by construction.
        Ok(records
            .iter()
            .map(WatchSource::to_source)
            .filter(|source| source.available_in(request.region.as_deref()))
            .collect())
    }

    async fn torrent_tier(&self, request: &ResolveRequest) -> Vec<Source> {
        // The index only understands movies keyed by IMDb id; anything else
        // skips the lookup without a network call.
        if request.media_type != MediaType::Movie {
            return Vec::new();
        }
        let Some(imdb_id) = request.imdb_id.as_deref().filter(|id| !id.is_empty()) else {
            return Vec::new();
        };

        self.torrent_index.lookup_movie(imdb_id).await
    }
}
