use strum::Display;

/// Paused is a sub-state of having an active source loaded, so a paused
/// sequencer is not idle.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Playing,
    Paused,
}
