use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("already connected to a voice channel")]
    AlreadyConnected,
    #[error("not connected to a voice channel")]
    NotConnected,
    #[error("no track is currently playing")]
    NothingPlaying,
    #[error("no track is currently paused")]
    NothingPaused,
    #[error("voice error: {0}")]
    Voice(String),
    #[error("the sequencer has shut down")]
    Closed,
}
