use tracing::{debug, error, info};

use crate::dto::command::Command;
use crate::dto::sequencer_response::SequencerResponse;
use crate::sequencer::Sequencer;
use crate::two_way_channel::TwoWayReceiver;

/// The single control context. Every state transition, including completion
/// notifications raised by the sink, goes through here one command at a time,
/// so two completions can never race into starting two playbacks.
pub(crate) async fn main_loop(
    mut receiver: TwoWayReceiver<Command, SequencerResponse>,
    mut sequencer: Sequencer,
) {
    while let Ok(command) = receiver.recv_async().await {
        debug!("Got command {command:?}");
        let response = match command {
            Command::Connect(sink) => Some(SequencerResponse::Ack(sequencer.connect(sink))),
            Command::Disconnect => Some(SequencerResponse::Ack(sequencer.disconnect())),
            Command::Play(url) => Some(SequencerResponse::Play(sequencer.request_play(url))),
            Command::Enqueue(item) => {
                sequencer.enqueue(item);
                None
            }
            Command::Pause => Some(SequencerResponse::Ack(sequencer.pause())),
            Command::Resume => Some(SequencerResponse::Ack(sequencer.resume())),
            Command::Stop => Some(SequencerResponse::Ack(sequencer.stop())),
            Command::Skip => Some(SequencerResponse::Ack(sequencer.skip())),
            Command::Clear => Some(SequencerResponse::Cleared(sequencer.clear())),
            Command::GetQueue => Some(SequencerResponse::Queue(sequencer.queue_snapshot())),
            Command::GetStatus => Some(SequencerResponse::Status(sequencer.status())),
            Command::Ended(generation, result) => {
                sequencer.on_ended(generation, result);
                None
            }
            Command::Shutdown => break,
        };
        if let Some(response) = response {
            if let Err(response) = receiver.respond(response) {
                error!("Error sending response: {response:?}");
            }
        }
    }
    info!("Sequencer loop completed");
}
