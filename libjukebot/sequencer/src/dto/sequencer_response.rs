use super::play_receipt::PlayReceipt;
use super::queue_item::QueueItem;
use super::sequencer_error::SequencerError;
use super::sequencer_status::SequencerStatus;

#[derive(Clone, Debug)]
pub(crate) enum SequencerResponse {
    Ack(Result<(), SequencerError>),
    Play(PlayReceipt),
    Queue(Vec<QueueItem>),
    Cleared(usize),
    Status(SequencerStatus),
}
