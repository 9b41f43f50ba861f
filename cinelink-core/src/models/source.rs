use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::id::SourceId;

/// Kind of media a source plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            _ => Err(format!("Unknown media type: {s}")),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
        }
    }
}

/// Which producer a unified source came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    Curated,
    Embed,
    Torrent,
}

/// Playback mechanism the client must use for a source. Assigned by the
/// producers at construction time; clients dispatch on this and never
/// inspect the locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackType {
    Embed,
    Hls,
    External,
}

impl FromStr for PlaybackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "embed" => Ok(Self::Embed),
            "hls" => Ok(Self::Hls),
            "external" => Ok(Self::External),
            _ => Err(format!("Unknown playback type: {s}")),
        }
    }
}

impl std::fmt::Display for PlaybackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embed => write!(f, "embed"),
            Self::Hls => write!(f, "hls"),
            Self::External => write!(f, "external"),
        }
    }
}

/// Curated-source trust status lifecycle.
///
/// One automatic edge (active -> flagged on first report) and two
/// operator-only edges (flagged -> active, non-removed -> removed).
/// `removed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Active,
    Flagged,
    Removed,
}

impl SourceStatus {
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Flagged)
                | (Self::Flagged, Self::Active)
                | (Self::Active, Self::Removed)
                | (Self::Flagged, Self::Removed)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Removed)
    }
}

impl FromStr for SourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "flagged" => Ok(Self::Flagged),
            "removed" => Ok(Self::Removed),
            _ => Err(format!("Unknown source status: {s}")),
        }
    }
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Flagged => write!(f, "flagged"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// License classification of a curated source. Mandatory on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenseType {
    PublicDomain,
    CreativeCommons,
    Commercial,
    Other,
}

impl FromStr for LicenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public-domain" => Ok(Self::PublicDomain),
            "creative-commons" => Ok(Self::CreativeCommons),
            "commercial" => Ok(Self::Commercial),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown license type: {s}")),
        }
    }
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PublicDomain => write!(f, "public-domain"),
            Self::CreativeCommons => write!(f, "creative-commons"),
            Self::Commercial => write!(f, "commercial"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Unified playable source, produced only by aggregation. Never persisted in
/// this form; ids for embed/torrent kinds are unique per response only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub origin: OriginKind,
    pub provider: String,
    pub title: String,
    pub quality: String,
    pub playback_type: PlaybackType,
    /// URL or magnet URI used to initiate playback
    pub locator: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub region_allowlist: Vec<String>,
    /// Only meaningful for curated sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SourceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_hint: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_hint: Option<u32>,
}

impl Source {
    /// Region gate: an empty allowlist means unrestricted, and a caller
    /// without a region is never filtered.
    #[must_use]
    pub fn available_in(&self, region: Option<&str>) -> bool {
        if self.region_allowlist.is_empty() {
            return true;
        }
        match region {
            Some(region) => self
                .region_allowlist
                .iter()
                .any(|code| code.eq_ignore_ascii_case(region)),
            None => true,
        }
    }
}

/// Persisted operator-curated source record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSource {
    pub id: SourceId,
    pub media_type: MediaType,
    pub media_id: String,
    pub title: String,
    pub provider: String,
    pub playback_type: PlaybackType,
    pub url: String,
    pub quality: String,
    pub language: String,
    pub license_type: LicenseType,
    pub license_proof_url: Option<String>,
    pub region_allowlist: Vec<String>,
    pub status: SourceStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a curated source record
#[derive(Debug, Clone)]
pub struct NewWatchSource {
    pub media_type: MediaType,
    pub media_id: String,
    pub title: String,
    pub provider: String,
    pub playback_type: PlaybackType,
    pub url: String,
    pub quality: String,
    pub language: String,
    pub license_type: LicenseType,
    pub license_proof_url: Option<String>,
    pub region_allowlist: Vec<String>,
    pub created_by: String,
}

impl WatchSource {
    #[must_use]
    pub fn new(params: NewWatchSource) -> Self {
        let now = Utc::now();
        Self {
            id: SourceId::new(),
            media_type: params.media_type,
            media_id: params.media_id,
            title: params.title,
            provider: params.provider,
            playback_type: params.playback_type,
            url: params.url,
            quality: params.quality,
            language: params.language,
            license_type: params.license_type,
            license_proof_url: params.license_proof_url,
            region_allowlist: params.region_allowlist,
            status: SourceStatus::Active,
            created_by: params.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Project into the unified source representation
    #[must_use]
    pub fn to_source(&self) -> Source {
        Source {
            id: self.id.to_string(),
            origin: OriginKind::Curated,
            provider: self.provider.clone(),
            title: self.title.clone(),
            quality: self.quality.clone(),
            playback_type: self.playback_type,
            locator: self.url.clone(),
            language: self.language.clone(),
            region_allowlist: self.region_allowlist.clone(),
            status: Some(self.status),
            size_hint: None,
            seed_hint: None,
            peer_hint: None,
        }
    }
}
