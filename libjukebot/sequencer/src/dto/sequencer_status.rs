use super::queue_item::QueueItem;
use super::sequencer_state::SequencerState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencerStatus {
    pub state: SequencerState,
    pub current: Option<QueueItem>,
    pub queued: usize,
}
