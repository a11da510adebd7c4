use std::{io, sync::Arc};

use futures::future::pending;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Child,
    sync::{mpsc, oneshot},
    time::{MissedTickBehavior, interval, timeout},
};

use crate::tasks::{
    process::control::ProcessController,
    relay::drain_utf8,
    tokio::{context::QueueContext, event::PumpSignal},
};

/// Reads a running child's stdout and stderr and watches for its exit or a
/// stop request.
///
/// Runs as its own tokio task. Output is forwarded to the worker in chunks, at
/// most one per poll tick.
#[derive(Debug)]
pub(crate) struct OutputPump {
    ctx: Arc<QueueContext>,
    controller: Arc<dyn ProcessController>,
    child: Child,
    pid: u32,
    chunk_tx: mpsc::Sender<String>,
}

impl OutputPump {
    pub(crate) fn new(
        ctx: Arc<QueueContext>,
        controller: Arc<dyn ProcessController>,
        child: Child,
        pid: u32,
        chunk_tx: mpsc::Sender<String>,
    ) -> Self {
        Self {
            ctx,
            controller,
            child,
            pid,
            chunk_tx,
        }
    }

    pub(crate) async fn run(mut self, done_tx: oneshot::Sender<PumpSignal>) {
        let signal = self.pump().await;

        #[cfg(feature = "tracing")]
        tracing::debug!(pid = self.pid, ?signal, "Output pump finished");

        if done_tx.send(signal).is_err() {
            #[cfg(feature = "tracing")]
            tracing::warn!(pid = self.pid, "Worker dropped before the pump signalled");
        }
    }

    async fn pump(&mut self) -> PumpSignal {
        let mut stdout = self.child.stdout.take();
        let mut stderr = self.child.stderr.take();

        let size = self.ctx.config.read_buffer_size;
        let mut out_buf = vec![0u8; size];
        let mut err_buf = vec![0u8; size];
        let mut captured: Vec<u8> = Vec::new();

        let mut ticker = interval(self.ctx.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                read = read_some(&mut stdout, &mut out_buf) => {
                    capture(read, &mut stdout, &out_buf, &mut captured);
                }
                read = read_some(&mut stderr, &mut err_buf) => {
                    capture(read, &mut stderr, &err_buf, &mut captured);
                }
                _ = ticker.tick() => {
                    // Before try_wait: stop() may already have killed the child
                    if self.ctx.is_stop_requested() {
                        self.forward(&mut captured, true).await;
                        let exit_code = self.terminate().await;
                        return PumpSignal::StoppedByRequest { exit_code };
                    }

                    match self.child.try_wait() {
                        Ok(Some(status)) => {
                            self.forward(&mut captured, true).await;
                            return PumpSignal::ChildExited { exit_code: status.code() };
                        }
                        Ok(None) => {}
                        Err(_e) => {
                            #[cfg(feature = "tracing")]
                            tracing::error!(pid = self.pid, error = %_e, "Failed to poll child process");

                            self.kill(true);
                            self.forward(&mut captured, true).await;
                            return PumpSignal::ChildExited { exit_code: None };
                        }
                    }

                    self.forward(&mut captured, false).await;
                }
            }
        }
    }

    /// Kills the tree until the child is reaped.
    async fn terminate(&mut self) -> Option<i32> {
        let poll = self.ctx.config.poll_interval();
        loop {
            self.kill(true);
            match timeout(poll, self.child.wait()).await {
                Ok(Ok(status)) => return status.code(),
                Ok(Err(_e)) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(pid = self.pid, error = %_e, "Failed to wait for child process");
                    return None;
                }
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(pid = self.pid, "Child still alive, retrying kill");
                }
            }
        }
    }

    fn kill(&self, whole_group: bool) {
        #[allow(clippy::used_underscore_binding)]
        if let Err(_e) = self.controller.kill_tree(self.pid, whole_group) {
            #[cfg(feature = "tracing")]
            tracing::warn!(pid = self.pid, error = %_e, "Failed to kill process tree");
        }
    }

    /// Sends what has been captured since the last tick.
    ///
    /// With `flush_all` an incomplete trailing UTF-8 sequence is sent too.
    async fn forward(&self, captured: &mut Vec<u8>, flush_all: bool) {
        let chunk = if flush_all && !captured.is_empty() {
            let chunk = String::from_utf8_lossy(captured).into_owned();
            captured.clear();
            Some(chunk)
        } else {
            drain_utf8(captured)
        };

        let Some(chunk) = chunk else {
            return;
        };
        if self.chunk_tx.send(chunk).await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!(pid = self.pid, "Output chunk dropped, worker is gone");
        }
    }
}

/// Reads from `src`, or never resolves once the stream is closed.
async fn read_some<R>(src: &mut Option<R>, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match src {
        Some(reader) => reader.read(buf).await,
        None => pending().await,
    }
}

fn capture<R>(read: io::Result<usize>, src: &mut Option<R>, buf: &[u8], captured: &mut Vec<u8>) {
    match read {
        // EOF
        Ok(0) => *src = None,
        Ok(n) => captured.extend_from_slice(&buf[..n]),
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "Failed to read child output");
            *src = None;
        }
    }
}
