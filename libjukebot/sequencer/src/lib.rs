mod dto;
mod event_loop;
mod queue;
mod resolver;
mod sequencer;
mod settings;
mod sink;
mod two_way_channel;

pub mod jukebot_sequencer {
    use std::sync::Arc;

    use tokio::sync::broadcast;
    use tracing::info;

    pub use crate::dto::play_receipt::PlayReceipt;
    pub use crate::dto::queue_item::QueueItem;
    pub use crate::dto::sequencer_error::SequencerError;
    pub use crate::dto::sequencer_event::SequencerEvent;
    pub use crate::dto::sequencer_state::SequencerState;
    pub use crate::dto::sequencer_status::SequencerStatus;
    pub use crate::resolver::{MediaResolver, ResolveError, Resolved};
    pub use crate::settings::Settings;
    pub use crate::sink::{CompletionHandle, SinkError, VoiceSink};

    use crate::dto::command::Command;
    use crate::dto::sequencer_response::SequencerResponse;
    use crate::event_loop::main_loop;
    use crate::sequencer::Sequencer;
    use crate::two_way_channel::{TwoWaySender, two_way_channel};

    /// Handle to the playback engine. One instance drives one voice session
    /// and one shared queue; all methods are safe to call from any task.
    #[derive(Clone, Debug)]
    pub struct JukebotSequencer {
        cmd_tx: TwoWaySender<Command, SequencerResponse>,
        event_tx: broadcast::Sender<SequencerEvent>,
    }

    impl JukebotSequencer {
        /// Spawns the sequencer's event loop. Must be called from within a
        /// tokio runtime.
        pub fn new(resolver: Arc<dyn MediaResolver>, settings: Settings) -> Self {
            let (event_tx, _) = broadcast::channel(32);
            let (cmd_tx, cmd_rx) = two_way_channel();
            let sequencer = Sequencer::new(resolver, settings, cmd_tx.clone(), event_tx.clone());
            tokio::spawn(main_loop(cmd_rx, sequencer));
            Self { cmd_tx, event_tx }
        }

        pub fn subscribe(&self) -> broadcast::Receiver<SequencerEvent> {
            self.event_tx.subscribe()
        }

        /// Installs the voice sink; queued items start playing immediately if
        /// the engine is idle.
        pub async fn connect(&self, sink: Box<dyn VoiceSink>) -> Result<(), SequencerError> {
            self.ack(Command::Connect(sink)).await
        }

        pub async fn disconnect(&self) -> Result<(), SequencerError> {
            self.ack(Command::Disconnect).await
        }

        /// Accepts a link for playback. Returns as soon as the request is
        /// registered; resolution and enqueueing continue in the background.
        pub async fn play(&self, url: impl Into<String>) -> Result<PlayReceipt, SequencerError> {
            match self.cmd_tx.get_response(Command::Play(url.into())).await {
                Ok(SequencerResponse::Play(receipt)) => Ok(receipt),
                Ok(_) => unreachable!("Should only receive a play receipt"),
                Err(_) => Err(SequencerError::Closed),
            }
        }

        pub async fn pause(&self) -> Result<(), SequencerError> {
            self.ack(Command::Pause).await
        }

        pub async fn resume(&self) -> Result<(), SequencerError> {
            self.ack(Command::Resume).await
        }

        pub async fn stop(&self) -> Result<(), SequencerError> {
            self.ack(Command::Stop).await
        }

        pub async fn skip(&self) -> Result<(), SequencerError> {
            self.ack(Command::Skip).await
        }

        /// Drops every pending item, reporting how many were removed. The
        /// current track keeps playing. Items whose resolution is still in
        /// flight are enqueued when they arrive, even after a clear.
        pub async fn clear(&self) -> Result<usize, SequencerError> {
            match self.cmd_tx.get_response(Command::Clear).await {
                Ok(SequencerResponse::Cleared(cleared)) => Ok(cleared),
                Ok(_) => unreachable!("Should only receive a cleared count"),
                Err(_) => Err(SequencerError::Closed),
            }
        }

        pub async fn queue(&self) -> Result<Vec<QueueItem>, SequencerError> {
            match self.cmd_tx.get_response(Command::GetQueue).await {
                Ok(SequencerResponse::Queue(items)) => Ok(items),
                Ok(_) => unreachable!("Should only receive a queue snapshot"),
                Err(_) => Err(SequencerError::Closed),
            }
        }

        pub async fn status(&self) -> Result<SequencerStatus, SequencerError> {
            match self.cmd_tx.get_response(Command::GetStatus).await {
                Ok(SequencerResponse::Status(status)) => Ok(status),
                Ok(_) => unreachable!("Should only receive a status"),
                Err(_) => Err(SequencerError::Closed),
            }
        }

        /// Shuts the event loop down. In-flight resolutions are abandoned.
        pub async fn join(self) -> Result<(), SequencerError> {
            info!("Shutting down sequencer");
            self.cmd_tx
                .send_async(Command::Shutdown)
                .await
                .map_err(|_| SequencerError::Closed)
        }

        async fn ack(&self, command: Command) -> Result<(), SequencerError> {
            match self.cmd_tx.get_response(command).await {
                Ok(SequencerResponse::Ack(result)) => result,
                Ok(_) => unreachable!("Should only receive an ack"),
                Err(_) => Err(SequencerError::Closed),
            }
        }
    }
}
