pub mod embed;
pub mod torrent;

pub use embed::{build_embed_sources, EmbedProvider, EMBED_PROVIDERS};
pub use torrent::{TorrentIndex, YtsClient};

#[cfg(test)]
pub use torrent::MockTorrentIndex;
