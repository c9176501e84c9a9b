//! Recognition bridge
//!
//! Decouples closet mutation from the external label-recognition worker.
//! The send side publishes one fire-and-forget request per new wardrobe
//! item; the receive side is a long-lived task that applies recognition
//! results back into closet state through the service's serialized
//! mutation path.

mod channel;
mod redis;

pub use channel::{ChannelEvent, MessageChannel, MessageStream};
pub use self::redis::RedisChannel;

use async_trait::async_trait;
use closet_common::envelope::{LabelRequest, LabelResponse};
use closet_common::{Error, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::service::ClosetService;

/// Send side of the bridge, as seen by the closet service.
#[async_trait]
pub trait LabelPublisher: Send + Sync {
    /// Submit one recognition request for an item's label image
    /// (base64-encoded). Failures return to the caller, which decides
    /// whether they matter.
    async fn publish_label(&self, user: &str, id: Uuid, raw_image: &str) -> Result<()>;
}

/// Bridges closet items to the recognition worker over a pub/sub channel.
pub struct RecognitionBridge {
    channel: Arc<dyn MessageChannel>,
    /// Outbound channel carrying recognition requests
    tx_channel: String,
    /// Inbound channel carrying recognition responses
    rx_channel: String,
}

impl RecognitionBridge {
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        tx_channel: impl Into<String>,
        rx_channel: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            tx_channel: tx_channel.into(),
            rx_channel: rx_channel.into(),
        }
    }

    /// Receive loop: subscribe, wait for the acknowledgement, then apply
    /// inbound recognition results until the transport fails, the
    /// subscription drops, or shutdown is signalled.
    ///
    /// Malformed payloads and per-message apply failures are logged and
    /// the loop continues; it is not restarted once it exits.
    pub async fn run_receive_loop(
        &self,
        service: Arc<ClosetService>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("running recognition receive loop on {}", self.rx_channel);

        let mut stream = match self.channel.subscribe(&self.rx_channel).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("error subscribing to {}: {}", self.rx_channel, e);
                return;
            }
        };

        loop {
            let event = tokio::select! {
                _ = shutdown.changed() => {
                    info!("recognition receive loop shutting down");
                    return;
                }
                event = stream.next_event() => event,
            };

            match event {
                Ok(ChannelEvent::Message(payload)) => {
                    if let Err(e) = self.on_message(&service, &payload).await {
                        error!("error processing message on {}: {}", self.rx_channel, e);
                    }
                }
                Ok(ChannelEvent::Subscription { count: 1 }) => {
                    info!("subscribed to {}", self.rx_channel);
                }
                Ok(ChannelEvent::Subscription { count: 0 }) => {
                    error!("unexpected unsubscribe from {}", self.rx_channel);
                    return;
                }
                Ok(ChannelEvent::Subscription { .. }) => {}
                Err(e) => {
                    error!("transport error on {}: {}", self.rx_channel, e);
                    return;
                }
            }
        }
    }

    async fn on_message(&self, service: &ClosetService, payload: &[u8]) -> Result<()> {
        debug!(
            "received message on {} ({} bytes)",
            self.rx_channel,
            payload.len()
        );

        let resp: LabelResponse = serde_json::from_slice(payload)?;
        let id = Uuid::parse_str(&resp.id)
            .map_err(|e| Error::Channel(format!("bad item id in recognition response: {}", e)))?;

        service.apply_recognized_text(&resp.user, id, &resp.text).await
    }
}

#[async_trait]
impl LabelPublisher for RecognitionBridge {
    async fn publish_label(&self, user: &str, id: Uuid, raw_image: &str) -> Result<()> {
        let req = LabelRequest {
            user: user.to_string(),
            id: id.to_string(),
            raw_image: raw_image.to_string(),
        };

        let payload = serde_json::to_vec(&req)?;
        self.channel.publish(&self.tx_channel, &payload).await
    }
}
