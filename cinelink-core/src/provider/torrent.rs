//! Torrent-index lookups.
//!
//! One outbound HTTP call per lookup, bounded by a timeout. This producer is
//! best-effort by contract: every failure mode degrades to an empty result
//! and must never fail an aggregation.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::time::Duration;

use crate::config::TorrentIndexConfig;
use crate::models::{OriginKind, PlaybackType, Source};
use crate::{Error, Result};

/// Announce trackers appended to every assembled magnet URI
const ANNOUNCE_TRACKERS: &[&str] = &[
    "udp://open.demonii.com:1337/announce",
    "udp://tracker.openbittorrent.com:80",
    "udp://tracker.coppersurfer.tk:6969",
    "udp://glotorrents.pw:6969/announce",
    "udp://tracker.opentrackr.org:1337/announce",
];

/// RFC 3986 unreserved characters stay literal; everything else is escaped
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Lookup port for the external torrent index
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TorrentIndex: Send + Sync {
    /// Best-effort lookup by IMDb id; failures of any kind yield `[]`
    async fn lookup_movie(&self, imdb_id: &str) -> Vec<Source>;
}

/// Client for the YTS movie index
pub struct YtsClient {
    http: reqwest::Client,
    base_url: String,
    enabled: bool,
}

impl YtsClient {
    pub fn new(config: &TorrentIndexConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled,
        })
    }

    async fn fetch_movie(&self, imdb_id: &str) -> Result<MovieDetailsResponse> {
        let response = self
            .http
            .get(format!("{}/movie_details.json", self.base_url))
            .query(&[("imdb_id", imdb_id)])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("torrent index request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Upstream(format!("torrent index returned an error: {e}")))?;

        response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("torrent index payload malformed: {e}")))
    }
}

#[async_trait]
impl TorrentIndex for YtsClient {
    async fn lookup_movie(&self, imdb_id: &str) -> Vec<Source> {
        if !self.enabled {
            return Vec::new();
        }

        // Upstream failures never escape this producer
        let response = match self.fetch_movie(imdb_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(imdb_id, error = %e, "torrent index lookup failed");
                return Vec::new();
            }
        };

        if response.status != "ok" {
            tracing::warn!(imdb_id, status = %response.status, "torrent index rejected lookup");
            return Vec::new();
        }

        let Some(movie) = response.data.and_then(|data| data.movie) else {
            return Vec::new();
        };

        movie
            .torrents
            .unwrap_or_default()
            .into_iter()
            .map(|torrent| {
                let label = match movie.year {
                    Some(year) => format!("{} ({}) [{}]", movie.title, year, torrent.quality),
                    None => format!("{} [{}]", movie.title, torrent.quality),
                };

                Source {
                    // Unique within one response; not stable across calls
                    id: format!("yts-{}-{}", movie.id, torrent.quality),
                    origin: OriginKind::Torrent,
                    provider: "YTS".to_string(),
                    title: movie.title.clone(),
                    quality: torrent.quality,
                    playback_type: PlaybackType::External,
                    locator: build_magnet(&torrent.hash, &label),
                    language: "und".to_string(),
                    region_allowlist: Vec::new(),
                    status: None,
                    size_hint: torrent.size,
                    seed_hint: torrent.seeds,
                    peer_hint: torrent.peers,
                }
            })
            .collect()
    }
}

/// Assemble a magnet URI from an info-hash and display label
fn build_magnet(hash: &str, label: &str) -> String {
    let mut magnet = format!(
        "magnet:?xt=urn:btih:{hash}&dn={}",
        utf8_percent_encode(label, URI_COMPONENT)
    );
    for tracker in ANNOUNCE_TRACKERS {
        magnet.push_str("&tr=");
        magnet.push_str(&utf8_percent_encode(tracker, URI_COMPONENT).to_string());
    }
    magnet
}

#[derive(Debug, Deserialize)]
struct MovieDetailsResponse {
    status: String,
    #[serde(default)]
    data: Option<MovieDetailsData>,
}

#[derive(Debug, Deserialize)]
struct MovieDetailsData {
    #[serde(default)]
    movie: Option<IndexedMovie>,
}

#[derive(Debug, Deserialize)]
struct IndexedMovie {
    id: u64,
    title: String,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    torrents: Option<Vec<IndexedTorrent>>,
}

#[derive(Debug, Deserialize)]
struct IndexedTorrent {
    hash: String,
    quality: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    seeds: Option<u32>,
    #[serde(default)]
    peers: Option<u32>,
}
