use std::path::Path;
use std::process::Stdio;

use eyre::Result;
use libjukebot_sequencer::jukebot_sequencer::{CompletionHandle, SinkError, VoiceSink};
use tokio::process::Command;
use tracing::info;

use crate::resolver::find_exe;

#[cfg(unix)]
use libc::{SIGCONT, SIGSTOP, SIGTERM};
#[cfg(not(unix))]
const SIGCONT: i32 = 0;
#[cfg(not(unix))]
const SIGSTOP: i32 = 0;
#[cfg(not(unix))]
const SIGTERM: i32 = 0;

/// Local audio output for running without a real voice gateway: one ffplay
/// process per track. Terminating the process funnels into the same
/// completion notification as a natural end of track.
pub(crate) struct FfplaySink {
    ffplay_path: String,
    current_pid: Option<u32>,
}

impl FfplaySink {
    pub(crate) fn new() -> Result<Self> {
        let ffplay_path = find_exe("FFPLAY_PATH", "ffplay")?;
        Ok(Self {
            ffplay_path,
            current_pid: None,
        })
    }

    #[cfg(unix)]
    fn signal_current(&self, signal: i32) -> Result<(), SinkError> {
        let Some(pid) = self.current_pid else {
            return Err(SinkError("no active playback process".to_owned()));
        };
        let result = unsafe { libc::kill(pid as i32, signal) };
        if result == 0 {
            Ok(())
        } else {
            Err(SinkError(format!(
                "error signaling ffplay: {}",
                std::io::Error::last_os_error()
            )))
        }
    }

    #[cfg(not(unix))]
    fn signal_current(&self, _signal: i32) -> Result<(), SinkError> {
        Err(SinkError(
            "playback control requires a unix host".to_owned(),
        ))
    }
}

impl VoiceSink for FfplaySink {
    fn play(&mut self, path: &Path, on_complete: CompletionHandle) -> Result<(), SinkError> {
        let mut child = Command::new(&self.ffplay_path)
            .args(["-nodisp", "-autoexit", "-loglevel", "error"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| SinkError(format!("error spawning ffplay: {e}")))?;
        self.current_pid = child.id();
        info!("Started ffplay for {}", path.display());

        tokio::spawn(async move {
            let result = match child.wait().await {
                // no exit code means the process was signaled, i.e. stopped
                // on purpose
                Ok(status) if status.success() || status.code().is_none() => Ok(()),
                Ok(status) => Err(SinkError(format!("ffplay exited with {status}"))),
                Err(e) => Err(SinkError(format!("error waiting for ffplay: {e}"))),
            };
            on_complete.notify(result);
        });
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SinkError> {
        self.signal_current(SIGSTOP)
    }

    fn resume(&mut self) -> Result<(), SinkError> {
        self.signal_current(SIGCONT)
    }

    fn stop(&mut self) -> Result<(), SinkError> {
        // a paused process won't act on the termination signal until resumed
        self.signal_current(SIGCONT).ok();
        self.signal_current(SIGTERM)
    }
}
