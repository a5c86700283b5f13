use std::fmt::{self, Debug, Formatter};

use super::queue_item::QueueItem;
use crate::sink::{SinkError, VoiceSink};

pub(crate) enum Command {
    Connect(Box<dyn VoiceSink>),
    Disconnect,
    Play(String),
    Enqueue(QueueItem),
    Pause,
    Resume,
    Stop,
    Skip,
    Clear,
    GetQueue,
    GetStatus,
    Ended(u64, Result<(), SinkError>),
    Shutdown,
}

impl Debug for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Connect(_) => write!(f, "Connect"),
            Command::Disconnect => write!(f, "Disconnect"),
            Command::Play(url) => write!(f, "Play({url})"),
            Command::Enqueue(item) => write!(f, "Enqueue({})", item.source_url),
            Command::Pause => write!(f, "Pause"),
            Command::Resume => write!(f, "Resume"),
            Command::Stop => write!(f, "Stop"),
            Command::Skip => write!(f, "Skip"),
            Command::Clear => write!(f, "Clear"),
            Command::GetQueue => write!(f, "GetQueue"),
            Command::GetStatus => write!(f, "GetStatus"),
            Command::Ended(generation, result) => write!(f, "Ended({generation}, {result:?})"),
            Command::Shutdown => write!(f, "Shutdown"),
        }
    }
}
