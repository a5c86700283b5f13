use eyre::Result;
use libjukebot_sequencer::jukebot_sequencer::{
    JukebotSequencer, SequencerError, SequencerState, VoiceSink,
};
use tracing::warn;

use crate::messaging::MessagingPort;

pub(crate) type SinkFactory = Box<dyn Fn() -> Result<Box<dyn VoiceSink>> + Send + Sync>;

/// Thin translation layer between inbound chat commands and the sequencer.
/// Holds no playback state of its own; it only reads the engine's state and
/// invokes its operations.
pub(crate) struct CommandHandler<P: MessagingPort> {
    engine: JukebotSequencer,
    port: P,
    prefix: String,
    sink_factory: SinkFactory,
}

impl<P: MessagingPort> CommandHandler<P> {
    pub(crate) fn new(
        engine: JukebotSequencer,
        port: P,
        prefix: String,
        sink_factory: SinkFactory,
    ) -> Self {
        Self {
            engine,
            port,
            prefix,
            sink_factory,
        }
    }

    /// Dispatches one inbound line. Lines without the command prefix are
    /// ignored; every recognized command gets exactly one reply.
    pub(crate) async fn dispatch(&self, line: &str) -> Result<()> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(&self.prefix) else {
            return Ok(());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim())),
            None => (rest, None),
        };
        let reply = match name {
            "join" => self.join().await,
            "leave" => self.leave().await,
            "play" => match arg {
                Some(url) if !url.is_empty() => self.play(url).await,
                _ => format!("Usage: {}play <url>", self.prefix),
            },
            "pause" => ack(self.engine.pause().await, "Paused the song!"),
            "resume" => ack(self.engine.resume().await, "Resumed the song!"),
            "stop" => ack(self.engine.stop().await, "Stopped the song!"),
            "skip" => match self.engine.skip().await {
                Ok(()) => "Skipped the song!".to_owned(),
                Err(SequencerError::NothingPlaying) => "No song to skip!".to_owned(),
                Err(e) => describe(e),
            },
            "queue" => self.show_queue().await,
            "clear" => match self.engine.clear().await {
                Ok(_) => "Cleared the queue!".to_owned(),
                Err(e) => describe(e),
            },
            "help" => self.help(),
            "" => return Ok(()),
            _ => format!("Unknown command: {name}. Try {}help", self.prefix),
        };
        self.port.send(&reply).await
    }

    async fn join(&self) -> String {
        let sink = match (self.sink_factory)() {
            Ok(sink) => sink,
            Err(e) => {
                warn!("Error creating voice sink: {e:?}");
                return "Couldn't open the audio output.".to_owned();
            }
        };
        match self.engine.connect(sink).await {
            Ok(()) => "Joined the voice channel!".to_owned(),
            Err(e) => describe(e),
        }
    }

    async fn leave(&self) -> String {
        match self.engine.disconnect().await {
            Ok(()) => "Left the voice channel!".to_owned(),
            Err(e) => describe(e),
        }
    }

    async fn play(&self, url: &str) -> String {
        match self.engine.play(url).await {
            Ok(receipt) => {
                let mut reply = String::new();
                if receipt.rewritten {
                    reply.push_str("Detected a YouTube Music link, converting to a YouTube link...\n");
                }
                if receipt.playlist {
                    reply.push_str("Detected a playlist, fetching songs...");
                } else {
                    reply.push_str(&format!("Added to queue: {}", receipt.url));
                }
                if !receipt.connected {
                    reply.push_str(&format!(
                        "\nYou need to join a voice channel first! Use {}join",
                        self.prefix
                    ));
                }
                reply
            }
            Err(e) => describe(e),
        }
    }

    async fn show_queue(&self) -> String {
        let (Ok(status), Ok(queue)) = (self.engine.status().await, self.engine.queue().await)
        else {
            return describe(SequencerError::Closed);
        };
        if status.current.is_none() && queue.is_empty() {
            return "The queue is empty!".to_owned();
        }

        let mut message = String::new();
        if let Some(current) = status.current {
            let paused = if status.state == SequencerState::Paused {
                " (paused)"
            } else {
                ""
            };
            message.push_str(&format!("Now playing: {}{paused}\n", current.title()));
        }
        if queue.is_empty() {
            message.push_str("The queue is empty!");
        } else {
            message.push_str("🎶 Current Queue:\n");
            for (idx, item) in queue.iter().enumerate() {
                message.push_str(&format!("{}. {}\n", idx + 1, item.title()));
            }
        }
        message.trim_end().to_owned()
    }

    fn help(&self) -> String {
        let p = &self.prefix;
        format!(
            "Commands:\n\
             {p}join - join the voice channel\n\
             {p}leave - leave the voice channel\n\
             {p}play <url> - queue a song or playlist\n\
             {p}pause / {p}resume - pause or resume the current song\n\
             {p}skip - skip the current song\n\
             {p}stop - stop the current song\n\
             {p}queue - show the queue\n\
             {p}clear - clear the queue"
        )
    }
}

fn ack(result: Result<(), SequencerError>, success: &str) -> String {
    match result {
        Ok(()) => success.to_owned(),
        Err(e) => describe(e),
    }
}

fn describe(error: SequencerError) -> String {
    match error {
        SequencerError::AlreadyConnected => "I'm already in a voice channel!".to_owned(),
        SequencerError::NotConnected => "I'm not in a voice channel!".to_owned(),
        SequencerError::NothingPlaying => "No song is currently playing.".to_owned(),
        SequencerError::NothingPaused => "No song is currently paused.".to_owned(),
        SequencerError::Voice(e) => format!("Something went wrong with the voice output: {e}"),
        SequencerError::Closed => "The player is shutting down.".to_owned(),
    }
}
