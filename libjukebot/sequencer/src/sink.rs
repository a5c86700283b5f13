use std::path::Path;

use tap::TapFallible;
use thiserror::Error;
use tracing::error;

use crate::dto::command::Command;
use crate::dto::sequencer_response::SequencerResponse;
use crate::two_way_channel::TwoWaySender;

#[derive(Clone, Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Posts the end-of-track notification back onto the sequencer's command
/// channel. Sinks may call this from any thread or task; the notification is
/// serialized with every other state mutation before the sequencer acts on it.
/// The handle is tagged with the playback it belongs to, so a notification
/// that outlives its sink (a replaced sink winding down, for example) is
/// recognized as stale and discarded instead of ending the wrong track.
pub struct CompletionHandle {
    cmd_tx: TwoWaySender<Command, SequencerResponse>,
    generation: u64,
}

impl CompletionHandle {
    pub(crate) fn new(
        cmd_tx: TwoWaySender<Command, SequencerResponse>,
        generation: u64,
    ) -> Self {
        Self { cmd_tx, generation }
    }

    pub fn notify(self, result: Result<(), SinkError>) {
        self.cmd_tx
            .send(Command::Ended(self.generation, result))
            .tap_err(|e| error!("Error sending completion notification: {e:?}"))
            .ok();
    }
}

/// The real-time audio output channel. `stop` must trigger the same completion
/// notification as natural end of track; the sequencer relies on that to
/// advance exactly once per skip.
pub trait VoiceSink: Send {
    fn play(&mut self, path: &Path, on_complete: CompletionHandle) -> Result<(), SinkError>;
    fn pause(&mut self) -> Result<(), SinkError>;
    fn resume(&mut self) -> Result<(), SinkError>;
    fn stop(&mut self) -> Result<(), SinkError>;
}
