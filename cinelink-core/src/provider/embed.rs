//! Templated third-party embed providers.
//!
//! The registry is a static, typed table: adding a vendor is a table edit and
//! the URL builders are checked at compile time. Building sources is pure and
//! total; there is no failure mode.

use crate::models::{MediaType, OriginKind, PlaybackType, Source};

/// One embed vendor in the static registry
pub struct EmbedProvider {
    pub key: &'static str,
    pub name: &'static str,
    pub quality: &'static str,
    pub movie_url: fn(&str) -> String,
    pub tv_url: fn(&str, u32, u32) -> String,
}

/// Registry declaration order is the order sources are returned in; clients
/// rely on it for default selection.
pub static EMBED_PROVIDERS: &[EmbedProvider] = &[
    EmbedProvider {
        key: "vidsrc",
        name: "VidSrc",
        quality: "1080p",
        movie_url: |id| format!("https://vidsrc.xyz/embed/movie/{id}"),
        tv_url: |id, s, e| format!("https://vidsrc.xyz/embed/tv/{id}/{s}/{e}"),
    },
    EmbedProvider {
        key: "vidsrcme",
        name: "VidSrc.me",
        quality: "1080p",
        movie_url: |id| format!("https://vidsrc.me/embed/movie?tmdb={id}"),
        tv_url: |id, s, e| format!("https://vidsrc.me/embed/tv?tmdb={id}&season={s}&episode={e}"),
    },
    EmbedProvider {
        key: "embedsu",
        name: "Embed.su",
        quality: "1080p",
        movie_url: |id| format!("https://embed.su/embed/movie/{id}"),
        tv_url: |id, s, e| format!("https://embed.su/embed/tv/{id}/{s}/{e}"),
    },
    EmbedProvider {
        key: "smashystream",
        name: "SmashyStream",
        quality: "720p",
        movie_url: |id| format!("https://player.smashy.stream/movie/{id}"),
        tv_url: |id, s, e| format!("https://player.smashy.stream/tv/{id}?s={s}&e={e}"),
    },
    EmbedProvider {
        key: "multiembed",
        name: "MultiEmbed",
        quality: "720p",
        movie_url: |id| format!("https://multiembed.mov/?video_id={id}&tmdb=1"),
        tv_url: |id, s, e| format!("https://multiembed.mov/?video_id={id}&tmdb=1&s={s}&e={e}"),
    },
    EmbedProvider {
        key: "2embed",
        name: "2Embed",
        quality: "720p",
        movie_url: |id| format!("https://www.2embed.cc/embed/{id}"),
        tv_url: |id, s, e| format!("https://www.2embed.cc/embedtv/{id}&s={s}&e={e}"),
    },
];

/// Build one source per registry entry, in declaration order.
///
/// Movies ignore `season`/`episode`. For tv, missing values fall back to
/// season 1 episode 1 so this producer never blocks an aggregation.
#[must_use]
pub fn build_embed_sources(
    media_type: MediaType,
    media_id: &str,
    season: Option<u32>,
    episode: Option<u32>,
) -> Vec<Source> {
    let season = season.unwrap_or(1);
    let episode = episode.unwrap_or(1);

    EMBED_PROVIDERS
        .iter()
        .map(|provider| {
            let locator = match media_type {
                MediaType::Movie => (provider.movie_url)(media_id),
                MediaType::Tv => (provider.tv_url)(media_id, season, episode),
            };

            Source {
                id: format!("embed-{}-{}", provider.key, media_id),
                origin: OriginKind::Embed,
                provider: provider.name.to_string(),
                title: format!("Watch on {}", provider.name),
                quality: provider.quality.to_string(),
                playback_type: PlaybackType::Embed,
                locator,
                language: "und".to_string(),
                region_allowlist: Vec::new(),
                status: None,
                size_hint: None,
                seed_hint: None,
                peer_hint: None,
            }
        })
        .collect()
}
