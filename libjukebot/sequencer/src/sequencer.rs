use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesOrdered;
use tap::TapFallible;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::dto::command::Command;
use crate::dto::play_receipt::PlayReceipt;
use crate::dto::queue_item::QueueItem;
use crate::dto::sequencer_error::SequencerError;
use crate::dto::sequencer_event::SequencerEvent;
use crate::dto::sequencer_response::SequencerResponse;
use crate::dto::sequencer_state::SequencerState;
use crate::dto::sequencer_status::SequencerStatus;
use crate::queue::PlaybackQueue;
use crate::resolver::{MediaResolver, ResolveError, Resolved, looks_like_playlist, normalize_url};
use crate::settings::Settings;
use crate::sink::{CompletionHandle, SinkError, VoiceSink};
use crate::two_way_channel::TwoWaySender;

/// Single-slot playback state machine. Owns the queue and the voice sink and
/// is the only component that mutates either; everything reaches it through
/// the command channel, including its own completion notifications.
pub(crate) struct Sequencer {
    queue: PlaybackQueue,
    sink: Option<Box<dyn VoiceSink>>,
    state: SequencerState,
    current: Option<QueueItem>,
    // Incremented for every playback handed to a sink and on disconnect.
    // Completion notifications carrying an older value are stale.
    generation: u64,
    resolver: Arc<dyn MediaResolver>,
    settings: Settings,
    cmd_tx: TwoWaySender<Command, SequencerResponse>,
    event_tx: broadcast::Sender<SequencerEvent>,
}

impl Sequencer {
    pub(crate) fn new(
        resolver: Arc<dyn MediaResolver>,
        settings: Settings,
        cmd_tx: TwoWaySender<Command, SequencerResponse>,
        event_tx: broadcast::Sender<SequencerEvent>,
    ) -> Self {
        Self {
            queue: PlaybackQueue::default(),
            sink: None,
            state: SequencerState::Idle,
            current: None,
            generation: 0,
            resolver,
            settings,
            cmd_tx,
            event_tx,
        }
    }

    pub(crate) fn connect(&mut self, sink: Box<dyn VoiceSink>) -> Result<(), SequencerError> {
        if self.sink.is_some() {
            return Err(SequencerError::AlreadyConnected);
        }
        info!("Voice sink connected");
        self.sink = Some(sink);
        if self.state == SequencerState::Idle && !self.queue.is_empty() {
            self.advance();
        }
        Ok(())
    }

    pub(crate) fn disconnect(&mut self) -> Result<(), SequencerError> {
        let Some(mut sink) = self.sink.take() else {
            return Err(SequencerError::NotConnected);
        };
        if self.state != SequencerState::Idle {
            sink.stop()
                .tap_err(|e| warn!("Error stopping sink on disconnect: {e}"))
                .ok();
        }
        // The stopped sink may still post a completion, possibly after a new
        // sink has taken over; bumping the generation marks it stale.
        self.generation += 1;
        self.state = SequencerState::Idle;
        self.current = None;
        info!("Voice sink disconnected");
        Ok(())
    }

    /// Accepts a play request and kicks off resolution in the background. The
    /// receipt only reports what is known synchronously; enqueueing happens
    /// once each item resolves.
    pub(crate) fn request_play(&self, url: String) -> PlayReceipt {
        let (url, rewritten) = normalize_url(&url);
        if rewritten {
            info!("Rewrote music link to {url}");
        }
        let playlist = looks_like_playlist(&url);
        self.spawn_resolution(url.clone());
        PlayReceipt {
            url,
            rewritten,
            playlist,
            connected: self.sink.is_some(),
        }
    }

    fn spawn_resolution(&self, url: String) {
        let resolver = Arc::clone(&self.resolver);
        let cmd_tx = self.cmd_tx.clone();
        let timeout = self.settings.resolve_timeout;
        tokio::spawn(async move {
            match resolve_with_timeout(&*resolver, &url, timeout).await {
                Ok(Resolved::Playlist(entries)) => {
                    info!("Expanded playlist into {} entries", entries.len());
                    // Entries resolve concurrently, but FuturesOrdered yields
                    // them in playlist order so enqueue order is preserved no
                    // matter which download finishes first.
                    let mut resolutions = entries
                        .into_iter()
                        .map(|entry| resolve_track(Arc::clone(&resolver), entry, timeout))
                        .collect::<FuturesOrdered<_>>();
                    while let Some(item) = resolutions.next().await {
                        if cmd_tx.send_async(Command::Enqueue(item)).await.is_err() {
                            warn!("Sequencer shut down mid-expansion");
                            return;
                        }
                    }
                }
                Ok(Resolved::Track(path)) => {
                    cmd_tx
                        .send_async(Command::Enqueue(QueueItem::resolved(url, path)))
                        .await
                        .tap_err(|_| warn!("Sequencer shut down before enqueue"))
                        .ok();
                }
                Err(e) => {
                    error!("Error resolving {url}: {e}");
                    // Enqueued anyway so queue order reflects request order;
                    // the sequencer skips it when it reaches the head.
                    cmd_tx
                        .send_async(Command::Enqueue(QueueItem::failed(url)))
                        .await
                        .ok();
                }
            }
        });
    }

    pub(crate) fn enqueue(&mut self, item: QueueItem) {
        info!("Enqueued {}", item.source_url);
        self.queue.enqueue(item.clone());
        self.event_tx.send(SequencerEvent::Enqueued(item)).ok();
        if self.sink.is_some() && self.state == SequencerState::Idle {
            self.advance();
        }
    }

    /// Pulls the next playable item and hands it to the sink. An explicit loop
    /// rather than recursion: a long run of failed resolutions is discarded
    /// without growing the stack and can never stall the queue.
    pub(crate) fn advance(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            debug!("No voice sink connected, leaving queue untouched");
            return;
        };
        loop {
            let Some(item) = self.queue.dequeue() else {
                info!("Queue empty");
                self.event_tx.send(SequencerEvent::QueueEnded).ok();
                return;
            };
            let Some(path) = item.playable_path() else {
                warn!("Skipping {}: no playable file", item.source_url);
                self.event_tx.send(SequencerEvent::Skipped(item)).ok();
                continue;
            };
            self.generation += 1;
            match sink.play(
                path,
                CompletionHandle::new(self.cmd_tx.clone(), self.generation),
            ) {
                Ok(()) => {
                    info!("Playing {}", path.display());
                    self.state = SequencerState::Playing;
                    self.current = Some(item.clone());
                    self.event_tx.send(SequencerEvent::Started(item)).ok();
                    return;
                }
                Err(e) => {
                    error!("Error starting playback for {}: {e}", item.source_url);
                    self.event_tx.send(SequencerEvent::Skipped(item)).ok();
                }
            }
        }
    }

    /// End-of-track notification, already marshaled onto this context by the
    /// command channel. Notifications from a superseded playback are dropped;
    /// acting on one would end a track that is still playing and start a
    /// second one on top of it. Playback errors are logged and treated as a
    /// natural end so the queue keeps moving.
    pub(crate) fn on_ended(&mut self, generation: u64, result: Result<(), SinkError>) {
        if generation != self.generation {
            debug!("Ignoring stale completion from playback {generation}");
            return;
        }
        if let Err(e) = result {
            error!("Playback ended with error: {e}");
        }
        self.state = SequencerState::Idle;
        match self.current.take() {
            Some(item) => {
                info!("Finished {}", item.source_url);
                self.event_tx.send(SequencerEvent::Ended(item)).ok();
            }
            // A completion can trail a disconnect; nothing to report.
            None => debug!("Completion received while idle"),
        }
        self.advance();
    }

    pub(crate) fn pause(&mut self) -> Result<(), SequencerError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(SequencerError::NotConnected);
        };
        if self.state != SequencerState::Playing {
            return Err(SequencerError::NothingPlaying);
        }
        sink.pause().map_err(|e| {
            error!("Error pausing sink: {e}");
            SequencerError::Voice(e.to_string())
        })?;
        self.state = SequencerState::Paused;
        self.event_tx.send(SequencerEvent::Paused).ok();
        Ok(())
    }

    pub(crate) fn resume(&mut self) -> Result<(), SequencerError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(SequencerError::NotConnected);
        };
        if self.state != SequencerState::Paused {
            return Err(SequencerError::NothingPaused);
        }
        sink.resume().map_err(|e| {
            error!("Error resuming sink: {e}");
            SequencerError::Voice(e.to_string())
        })?;
        self.state = SequencerState::Playing;
        self.event_tx.send(SequencerEvent::Resumed).ok();
        Ok(())
    }

    pub(crate) fn stop(&mut self) -> Result<(), SequencerError> {
        self.halt()?;
        self.event_tx.send(SequencerEvent::Stopped).ok();
        Ok(())
    }

    pub(crate) fn skip(&mut self) -> Result<(), SequencerError> {
        self.halt()
    }

    /// Halts the current track by forcing the sink's natural completion path.
    /// The completion notification flips the state and advances, so a skip
    /// moves the queue forward by exactly one item, never two.
    fn halt(&mut self) -> Result<(), SequencerError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(SequencerError::NotConnected);
        };
        if self.state != SequencerState::Playing {
            return Err(SequencerError::NothingPlaying);
        }
        sink.stop().map_err(|e| {
            error!("Error stopping sink: {e}");
            SequencerError::Voice(e.to_string())
        })
    }

    pub(crate) fn clear(&mut self) -> usize {
        let cleared = self.queue.clear_all();
        info!("Cleared {cleared} pending items");
        self.event_tx.send(SequencerEvent::QueueCleared(cleared)).ok();
        cleared
    }

    pub(crate) fn queue_snapshot(&self) -> Vec<QueueItem> {
        self.queue.snapshot()
    }

    pub(crate) fn status(&self) -> SequencerStatus {
        SequencerStatus {
            state: self.state,
            current: self.current.clone(),
            queued: self.queue.len(),
        }
    }
}

async fn resolve_with_timeout(
    resolver: &dyn MediaResolver,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Resolved, ResolveError> {
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, resolver.resolve(url))
            .await
            .unwrap_or_else(|_| {
                Err(ResolveError(format!(
                    "resolution timed out after {timeout:?}"
                )))
            }),
        None => resolver.resolve(url).await,
    }
}

/// Resolves one playlist entry to a queue item. Failures (including nested
/// playlists, which the extractor should not produce) become unresolved items
/// so the expansion keeps its order.
async fn resolve_track(
    resolver: Arc<dyn MediaResolver>,
    url: String,
    timeout: Option<Duration>,
) -> QueueItem {
    match resolve_with_timeout(&*resolver, &url, timeout).await {
        Ok(Resolved::Track(path)) => QueueItem::resolved(url, path),
        Ok(Resolved::Playlist(_)) => {
            warn!("Nested playlist at {url}, skipping");
            QueueItem::failed(url)
        }
        Err(e) => {
            error!("Error resolving {url}: {e}");
            QueueItem::failed(url)
        }
    }
}
