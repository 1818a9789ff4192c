//! Settlement clock used to model exchange latency.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Source of the settlement delay.
///
/// The workflow never calls a timer directly, so tests can settle exchanges
/// instantly or hold them open for as long as they need.
pub trait SettlementClock: Send + Sync {
    fn sleep<'a>(&'a self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Real timer backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl SettlementClock for TokioClock {
    fn sleep<'a>(&'a self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Clock that completes every delay immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantClock;

impl SettlementClock for InstantClock {
    fn sleep<'a>(&'a self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let _ = duration;
        Box::pin(std::future::ready(()))
    }
}
