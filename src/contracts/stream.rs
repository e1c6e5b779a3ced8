//! Event stream plumbing shared by the contract wrappers
//!
//! WebSocket/IPC clients get a real `eth_subscribe` subscription; HTTP
//! clients fall back to filter polling. Either way the decoded events are
//! forwarded into a bounded channel by a spawned task that stops as soon
//! as the receiving half is dropped.

use alloy::contract::Event;
use alloy::providers::DynProvider;
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc;

const STREAM_BUFFER: usize = 100;

/// Buffered stream of decoded contract events
///
/// Dropping the stream cancels the underlying subscription or poller.
pub struct EventStream<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> EventStream<T> {
    /// Wait for the next event. `None` means the stream ended (endpoint
    /// dropped the subscription or a log failed to decode).
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Non-blocking poll for a buffered event
    pub fn try_next(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

/// Spawn a task forwarding decoded logs into an [`EventStream`]
pub(crate) async fn spawn_event_forwarder<E, T>(
    event: Event<DynProvider, E>,
    subscriptions: bool,
    convert: fn(E, &Log) -> T,
) -> Result<EventStream<T>>
where
    E: SolEvent + Send + Sync + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    if subscriptions {
        let sub = event
            .subscribe()
            .await
            .context("Log subscription failed")?;
        tokio::spawn(async move {
            let mut stream = sub.into_stream();
            while let Some(next) = stream.next().await {
                let (decoded, log) = match next {
                    Ok(pair) => pair,
                    Err(err) => {
                        tracing::warn!(error = %err, "event stream decode failed, stopping");
                        break;
                    }
                };
                if tx.send(convert(decoded, &log)).await.is_err() {
                    break;
                }
            }
        });
    } else {
        let poller = event.watch().await.context("Log filter install failed")?;
        tokio::spawn(async move {
            let mut stream = poller.into_stream();
            while let Some(next) = stream.next().await {
                let (decoded, log) = match next {
                    Ok(pair) => pair,
                    Err(err) => {
                        tracing::warn!(error = %err, "event poll decode failed, stopping");
                        break;
                    }
                };
                if tx.send(convert(decoded, &log)).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(EventStream { rx })
}
