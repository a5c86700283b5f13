use std::collections::VecDeque;

use crate::dto::queue_item::QueueItem;

/// FIFO of pending tracks, insertion order = play order. All access happens on
/// the sequencer's event loop; concurrent enqueues from in-flight resolutions
/// are serialized by the command channel before they reach this container, so
/// no item can ever be dequeued twice and snapshots are point-in-time
/// consistent.
#[derive(Debug, Default)]
pub(crate) struct PlaybackQueue {
    items: VecDeque<QueueItem>,
}

impl PlaybackQueue {
    pub(crate) fn enqueue(&mut self, item: QueueItem) {
        self.items.push_back(item);
    }

    pub(crate) fn dequeue(&mut self) -> Option<QueueItem> {
        self.items.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Removes every pending item and reports how many were dropped. The item
    /// currently playing is not owned by the queue and is unaffected.
    pub(crate) fn clear_all(&mut self) -> usize {
        let cleared = self.items.len();
        self.items.clear();
        cleared
    }

    pub(crate) fn snapshot(&self) -> Vec<QueueItem> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(url: &str) -> QueueItem {
        QueueItem::failed(url)
    }

    #[test]
    fn dequeues_in_insertion_order() {
        let mut queue = PlaybackQueue::default();
        queue.enqueue(item("a"));
        queue.enqueue(item("b"));
        queue.enqueue(item("c"));

        assert_eq!(Some(item("a")), queue.dequeue());
        assert_eq!(Some(item("b")), queue.dequeue());
        assert_eq!(Some(item("c")), queue.dequeue());
        assert_eq!(None, queue.dequeue());
    }

    #[test]
    fn clear_reports_dropped_count() {
        let mut queue = PlaybackQueue::default();
        queue.enqueue(item("a"));
        queue.enqueue(item("b"));

        assert_eq!(2, queue.clear_all());
        assert!(queue.is_empty());
        assert_eq!(0, queue.clear_all());
    }

    #[test]
    fn snapshot_does_not_consume() {
        let mut queue = PlaybackQueue::default();
        queue.enqueue(item("a"));
        queue.enqueue(item("b"));

        let snapshot = queue.snapshot();
        assert_eq!(vec![item("a"), item("b")], snapshot);
        assert_eq!(2, queue.len());
        assert_eq!(Some(item("a")), queue.dequeue());
    }
}
