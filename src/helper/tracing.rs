use std::future::Future;

#[cfg(feature = "tracing")]
use tracing::{Instrument, Level, instrument::Instrumented};

pub trait MaybeInstrument: Future + Sized {
    /// Runs the future inside a debug span tagged with the queue name.
    #[cfg(feature = "tracing")]
    fn in_queue_span(self, name: &'static str, queue: &str) -> Instrumented<Self> {
        let span = tracing::span!(Level::DEBUG, "async_op", name = name, queue = %queue);
        self.instrument(span)
    }

    #[cfg(not(feature = "tracing"))]
    fn in_queue_span(self, _name: &'static str, _queue: &str) -> Self {
        self
    }
}

impl<F: Future> MaybeInstrument for F {}
