use flume::{Receiver, RecvError, SendError, Sender};
use tokio::sync::oneshot::{Sender as OneShotSender, channel as oneshot_channel};

type Envelope<TIn, TOut> = (TIn, Option<OneShotSender<TOut>>);

/// Command channel with an optional per-message response. Every message goes
/// through the same flume queue, so senders on any thread or task are
/// serialized before the receiver sees them.
pub(crate) fn two_way_channel<TIn, TOut>() -> (TwoWaySender<TIn, TOut>, TwoWayReceiver<TIn, TOut>) {
    let (tx, rx) = flume::unbounded();
    (TwoWaySender { tx }, TwoWayReceiver { rx, responder: None })
}

#[derive(Debug)]
pub(crate) struct TwoWaySender<TIn, TOut> {
    tx: Sender<Envelope<TIn, TOut>>,
}

// A derived Clone would bound TIn: Clone, but messages only ever move through
// the channel by value. Only the sender half is cloned.
impl<TIn, TOut> Clone for TwoWaySender<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TwoWayReceiver<TIn, TOut> {
    rx: Receiver<Envelope<TIn, TOut>>,
    responder: Option<OneShotSender<TOut>>,
}

impl<TIn, TOut> TwoWaySender<TIn, TOut> {
    pub(crate) fn send(&self, message: TIn) -> Result<(), SendError<Envelope<TIn, TOut>>> {
        self.tx.send((message, None))
    }

    pub(crate) async fn send_async(
        &self,
        message: TIn,
    ) -> Result<(), SendError<Envelope<TIn, TOut>>> {
        self.tx.send_async((message, None)).await
    }

    pub(crate) async fn get_response(&self, message: TIn) -> Result<TOut, String> {
        let (response_tx, response_rx) = oneshot_channel();
        self.tx
            .send_async((message, Some(response_tx)))
            .await
            .map_err(|e| format!("Error sending message: {e:?}"))?;
        response_rx
            .await
            .map_err(|e| format!("Error receiving response: {e:?}"))
    }
}

impl<TIn, TOut> TwoWayReceiver<TIn, TOut> {
    pub(crate) async fn recv_async(&mut self) -> Result<TIn, RecvError> {
        let (message, responder) = self.rx.recv_async().await?;
        self.responder = responder;
        Ok(message)
    }

    /// Answers the message most recently returned by `recv_async`. A message
    /// sent without a responder ignores the response.
    pub(crate) fn respond(&mut self, response: TOut) -> Result<(), TOut> {
        match self.responder.take() {
            Some(responder) => responder.send(response),
            None => Ok(()),
        }
    }
}
