//! Message channel collaborator boundary
//!
//! The bridge is written against these traits; the Redis adapter lives in
//! the sibling module and tests substitute scripted streams.

use async_trait::async_trait;
use closet_common::Result;

/// One inbound event from a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A data message published to the channel
    Message(Vec<u8>),
    /// Subscription state change carrying the active subscription count.
    /// Count 1 acknowledges the subscribe; count 0 is an unexpected
    /// unsubscribe.
    Subscription { count: usize },
}

/// Inbound event stream for one subscription.
#[async_trait]
pub trait MessageStream: Send {
    /// Block for the next event. An `Err` is a transport failure; the
    /// subscription is unusable afterwards.
    async fn next_event(&mut self) -> Result<ChannelEvent>;
}

/// Publish/subscribe channel.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// One synchronous, fire-and-forget publish.
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()>;

    /// Open a subscription on its own inbound connection.
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn MessageStream>>;
}
