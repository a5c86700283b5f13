use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::Result;
use lazy_regex::regex_is_match;
use libjukebot_sequencer::jukebot_sequencer::{MediaResolver, ResolveError, Resolved};
use tap::TapFallible;
use tracing::{error, info, warn};
use which::which;
use youtube_dl::{YoutubeDl, YoutubeDlOutput};

pub(crate) fn find_exe(env_var: &str, exe_name: &str) -> Result<String> {
    let path =
        env::var(env_var).or_else(|_| which(exe_name).map(|p| p.to_string_lossy().to_string()))?;

    info!("Using {exe_name} path: {path:?}");
    Ok(path)
}

/// Wraps yt-dlp: playlist links expand into their entry links, everything else
/// downloads to a local audio file named after the video id. Files already in
/// the download directory are reused.
pub(crate) struct YtDlpResolver {
    yt_dlp_path: String,
    ffmpeg_path: Option<String>,
    download_dir: PathBuf,
}

impl YtDlpResolver {
    pub(crate) fn new(download_dir: PathBuf) -> Result<Self> {
        let yt_dlp_path =
            find_exe("YT_DLP_PATH", "yt-dlp").tap_err(|e| error!("yt-dlp path not found: {e:?}"))?;
        let ffmpeg_path = find_exe("FFMPEG_PATH", "ffmpeg")
            .tap_err(|e| warn!("ffmpeg not found, audio extraction may fail: {e:?}"))
            .ok();
        clean_partial_downloads(&download_dir);
        Ok(Self {
            yt_dlp_path,
            ffmpeg_path,
            download_dir,
        })
    }

    async fn probe(&self, url: &str, flat_playlist: bool) -> Result<YoutubeDlOutput, ResolveError> {
        let mut command = YoutubeDl::new(url);
        command.youtube_dl_path(&self.yt_dlp_path);
        if flat_playlist {
            // prevents yt-dlp from enumerating every video up front, which
            // can take a long time on large playlists
            command.extra_arg("--flat-playlist");
        }
        command
            .run_async()
            .await
            .map_err(|e| ResolveError(format!("error probing {url}: {e}")))
    }

    async fn download(&self, url: &str) -> Result<Resolved, ResolveError> {
        let video = match self.probe(url, false).await? {
            YoutubeDlOutput::SingleVideo(video) => video,
            YoutubeDlOutput::Playlist(playlist) => {
                return Err(ResolveError(format!(
                    "expected a single video at {url}, found playlist {:?}",
                    playlist.title
                )));
            }
        };
        if let Some(existing) = find_downloaded(&self.download_dir, &video.id) {
            info!("Reusing downloaded file {}", existing.display());
            return Ok(Resolved::Track(existing));
        }

        info!("Downloading audio for {url}");
        let mut command = YoutubeDl::new(url);
        command
            .youtube_dl_path(&self.yt_dlp_path)
            .extract_audio(true)
            .format("bestaudio/best")
            .output_template("%(id)s.%(ext)s");
        if let Some(ffmpeg) = &self.ffmpeg_path {
            command.extra_arg("--ffmpeg-location").extra_arg(ffmpeg);
        }
        command
            .download_to_async(&self.download_dir)
            .await
            .map_err(|e| ResolveError(format!("error downloading {url}: {e}")))?;
        info!("Download complete for {url}");

        find_downloaded(&self.download_dir, &video.id)
            .map(Resolved::Track)
            .ok_or_else(|| {
                ResolveError(format!(
                    "download finished but no file found for id {}",
                    video.id
                ))
            })
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve(&self, url: &str) -> Result<Resolved, ResolveError> {
        if is_playlist_url(url) {
            match self.probe(url, true).await? {
                YoutubeDlOutput::Playlist(playlist) => {
                    info!("Found playlist: {:?}", playlist.title);
                    let entries = playlist
                        .entries
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|entry| entry.webpage_url.or(entry.url))
                        .collect();
                    Ok(Resolved::Playlist(entries))
                }
                // a "playlist" link that turned out to be one video
                YoutubeDlOutput::SingleVideo(_) => self.download(url).await,
            }
        } else {
            self.download(url).await
        }
    }
}

fn is_playlist_url(url: &str) -> bool {
    regex_is_match!(r"[?&]list=|/playlist", url)
}

fn is_partial(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("part" | "ytdl" | "temp")
    )
}

fn find_downloaded(dir: &Path, id: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir)
        .tap_err(|e| error!("Error reading download dir: {e:?}"))
        .ok()?;
    entries
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.file_stem().is_some_and(|stem| stem == id) && !is_partial(path))
}

/// Leftovers from interrupted downloads confuse the id lookup, so they are
/// removed on startup.
fn clean_partial_downloads(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if is_partial(&path) {
            info!("Removing partial download {}", path.display());
            fs::remove_file(&path)
                .tap_err(|e| warn!("Error removing partial download: {e:?}"))
                .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn playlist_url_detection() {
        assert!(is_playlist_url(
            "https://www.youtube.com/playlist?list=PL123"
        ));
        assert!(is_playlist_url(
            "https://www.youtube.com/watch?v=abc&list=PL123"
        ));
        assert!(!is_playlist_url("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn finds_completed_download_by_id() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("abc123.m4a"), b"audio").unwrap();
        fs::write(dir.path().join("abc123.part"), b"partial").unwrap();
        fs::write(dir.path().join("other.m4a"), b"audio").unwrap();

        let found = find_downloaded(dir.path(), "abc123").unwrap();
        assert_eq!(dir.path().join("abc123.m4a"), found);
        assert_eq!(None, find_downloaded(dir.path(), "missing"));
    }

    #[test]
    fn removes_partial_downloads_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("keep.m4a"), b"audio").unwrap();
        fs::write(dir.path().join("drop.part"), b"partial").unwrap();
        fs::write(dir.path().join("drop.ytdl"), b"state").unwrap();

        clean_partial_downloads(dir.path());

        assert!(dir.path().join("keep.m4a").exists());
        assert!(!dir.path().join("drop.part").exists());
        assert!(!dir.path().join("drop.ytdl").exists());
    }
}
