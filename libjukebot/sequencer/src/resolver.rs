use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

const MUSIC_DOMAIN: &str = "https://music.youtube.com";
const CANONICAL_DOMAIN: &str = "https://www.youtube.com";

#[derive(Clone, Debug, Error)]
#[error("{0}")]
pub struct ResolveError(pub String);

/// Outcome of resolving a single link: either a locally playable file or an
/// expansion into individual item links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    Track(PathBuf),
    Playlist(Vec<String>),
}

/// Turns a user-supplied link into a playable file or a list of links.
/// Resolution is the only long-running operation in the system and always runs
/// off the sequencer's control context. Failures are skip-worthy, never fatal.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<Resolved, ResolveError>;
}

/// Rewrites music-subdomain links to the canonical domain before resolution.
pub(crate) fn normalize_url(url: &str) -> (String, bool) {
    if let Some(rest) = url.strip_prefix(MUSIC_DOMAIN) {
        (format!("{CANONICAL_DOMAIN}{rest}"), true)
    } else {
        (url.to_owned(), false)
    }
}

/// Cheap textual guess used only for the acknowledgment message; the actual
/// expansion decision comes from the resolver output.
pub(crate) fn looks_like_playlist(url: &str) -> bool {
    url.contains("playlist")
}
