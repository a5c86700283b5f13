pub(crate) mod command;
pub(crate) mod play_receipt;
pub(crate) mod queue_item;
pub(crate) mod sequencer_error;
pub(crate) mod sequencer_event;
pub(crate) mod sequencer_response;
pub(crate) mod sequencer_state;
pub(crate) mod sequencer_status;
