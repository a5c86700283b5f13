mod handlers;
mod messaging;
mod resolver;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use eyre::{Context, Result, eyre};
use libjukebot_sequencer::jukebot_sequencer::{JukebotSequencer, Settings, VoiceSink};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::handlers::CommandHandler;
use crate::messaging::StdoutPort;
use crate::resolver::YtDlpResolver;
use crate::sink::FfplaySink;

#[derive(Debug, Parser)]
#[command(version, about = "Queue-ordered music playback bot")]
struct Args {
    /// Command prefix, e.g. "!" for "!play"
    #[arg(long, env = "JUKEBOT_PREFIX", default_value = "!")]
    prefix: String,
    /// Where downloaded audio files are stored
    #[arg(long, env = "JUKEBOT_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,
    /// Abandon a single download after this many seconds
    #[arg(long, env = "JUKEBOT_RESOLVE_TIMEOUT")]
    resolve_timeout: Option<u64>,
}

fn default_download_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "jukebot")
        .ok_or_else(|| eyre!("no home directory available"))?;
    Ok(dirs.cache_dir().join("downloads"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let download_dir = match args.download_dir {
        Some(dir) => dir,
        None => default_download_dir()?,
    };
    std::fs::create_dir_all(&download_dir)
        .wrap_err_with(|| format!("error creating download dir {}", download_dir.display()))?;
    info!("Storing downloads in {}", download_dir.display());

    let resolver = Arc::new(YtDlpResolver::new(download_dir)?);
    let settings = Settings {
        resolve_timeout: args.resolve_timeout.map(Duration::from_secs),
    };
    let engine = JukebotSequencer::new(resolver, settings);
    let handler = CommandHandler::new(
        engine.clone(),
        StdoutPort,
        args.prefix,
        Box::new(|| FfplaySink::new().map(|sink| Box::new(sink) as Box<dyn VoiceSink>)),
    );

    info!("Reading commands from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        handler.dispatch(&line).await?;
    }

    engine.join().await.ok();
    Ok(())
}
