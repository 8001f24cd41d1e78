//! Single-shot result channel
//!
//! A session reports its final outcome exactly once, either to a callback
//! registered with `on_result` or to a [`ResultReceiver`] obtained from
//! `subscribe`. Only one registration is accepted. An outcome produced
//! before anything registered is held and delivered on registration.

use super::error::{Result, SessionError};
use crate::media::MediaItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::debug;

/// Final outcome of a selection session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionOutcome {
    /// The user confirmed; the ordered selection
    Selected(Vec<MediaItem>),
    /// The user aborted; no partial selection is reported
    Cancelled,
    /// The session hit an unrecoverable desync
    Failed(String),
}

impl SelectionOutcome {
    /// Selected items, if the session resolved
    #[must_use]
    pub fn selected(&self) -> Option<&[MediaItem]> {
        match self {
            Self::Selected(items) => Some(items),
            Self::Cancelled | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

type Callback = Box<dyn FnOnce(SelectionOutcome) + Send + 'static>;

enum Sink {
    Callback(Callback),
    Oneshot(oneshot::Sender<SelectionOutcome>),
}

impl Sink {
    fn deliver(self, outcome: SelectionOutcome) {
        match self {
            Self::Callback(callback) => callback(outcome),
            Self::Oneshot(sender) => {
                if sender.send(outcome).is_err() {
                    debug!(target = "mediapick.session", "result receiver dropped before delivery");
                }
            }
        }
    }
}

/// Holds the registered sink and fires it at most once
#[derive(Default)]
pub(crate) struct ResultChannel {
    sink: Option<Sink>,
    pending: Option<SelectionOutcome>,
    registered: bool,
    fired: bool,
}

impl ResultChannel {
    pub(crate) fn on_result<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnOnce(SelectionOutcome) + Send + 'static,
    {
        self.register(Sink::Callback(Box::new(callback)))
    }

    pub(crate) fn subscribe(&mut self) -> Result<ResultReceiver> {
        let (sender, receiver) = oneshot::channel();
        self.register(Sink::Oneshot(sender))?;
        Ok(ResultReceiver { receiver })
    }

    /// Fire the outcome; later calls are ignored
    pub(crate) fn fire(&mut self, outcome: SelectionOutcome) {
        if self.fired {
            return;
        }
        self.fired = true;

        match self.sink.take() {
            Some(sink) => sink.deliver(outcome),
            None => self.pending = Some(outcome),
        }
    }

    #[cfg(test)]
    pub(crate) const fn has_fired(&self) -> bool {
        self.fired
    }

    fn register(&mut self, sink: Sink) -> Result<()> {
        if self.registered {
            return Err(SessionError::ResultAlreadyRegistered);
        }
        self.registered = true;

        match self.pending.take() {
            Some(outcome) => sink.deliver(outcome),
            None => self.sink = Some(sink),
        }
        Ok(())
    }
}

impl fmt::Debug for ResultChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultChannel")
            .field("registered", &self.registered)
            .field("fired", &self.fired)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Awaitable end of the result channel
///
/// Resolves to `None` if the session is dropped without finishing.
#[derive(Debug)]
pub struct ResultReceiver {
    receiver: oneshot::Receiver<SelectionOutcome>,
}

impl ResultReceiver {
    /// Take the outcome if it has already been delivered
    pub fn try_recv(&mut self) -> Option<SelectionOutcome> {
        self.receiver.try_recv().ok()
    }

    /// Block the current thread until the outcome arrives
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime.
    #[must_use]
    pub fn blocking_recv(self) -> Option<SelectionOutcome> {
        self.receiver.blocking_recv().ok()
    }
}

impl Future for ResultReceiver {
    type Output = Option<SelectionOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(std::result::Result::ok)
    }
}
