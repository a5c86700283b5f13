use strum::Display;

use super::queue_item::QueueItem;

/// Broadcast notifications for queue progress. Playback advancement is driven
/// internally; subscribers only observe it.
#[derive(Clone, Debug, Display)]
pub enum SequencerEvent {
    Enqueued(QueueItem),
    Started(QueueItem),
    Skipped(QueueItem),
    Ended(QueueItem),
    Paused,
    Resumed,
    Stopped,
    QueueCleared(usize),
    QueueEnded,
}
