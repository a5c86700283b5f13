use std::path::{Path, PathBuf};

/// One track awaiting playback. Created as soon as a play request (or a
/// playlist entry) is accepted; the local path stays empty when resolution
/// failed so the sequencer can skip it without losing queue order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueItem {
    pub source_url: String,
    pub local_path: Option<PathBuf>,
}

impl QueueItem {
    pub fn resolved(source_url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            local_path: Some(local_path.into()),
        }
    }

    pub fn failed(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            local_path: None,
        }
    }

    /// The resolved file, but only if it still points at a real file on disk.
    pub(crate) fn playable_path(&self) -> Option<&Path> {
        self.local_path
            .as_deref()
            .filter(|path| path.is_file())
    }

    /// Human-readable name for queue listings: the file stem once resolved,
    /// the original link otherwise.
    pub fn title(&self) -> String {
        self.local_path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_url.clone())
    }
}
