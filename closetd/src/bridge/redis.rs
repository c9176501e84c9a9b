//! Redis adapter for the message channel
//!
//! Publishing runs over a multiplexed connection opened at construction;
//! each subscription gets its own dedicated pub/sub connection. Failure to
//! open the publish connection is fatal to construction, which in turn
//! prevents service startup.

use async_trait::async_trait;
use closet_common::{Error, Result};
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::pin::Pin;
use tracing::info;

use super::channel::{ChannelEvent, MessageChannel, MessageStream};

fn channel_error(err: redis::RedisError) -> Error {
    Error::Channel(err.to_string())
}

pub struct RedisChannel {
    client: redis::Client,
    publish_conn: MultiplexedConnection,
}

impl RedisChannel {
    /// Dial the Redis server and open the outbound connection.
    pub async fn connect(url: &str) -> Result<Self> {
        info!("dialing redis server at {}", url);

        let client = redis::Client::open(url).map_err(channel_error)?;
        let publish_conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(channel_error)?;

        Ok(Self {
            client,
            publish_conn,
        })
    }
}

#[async_trait]
impl MessageChannel for RedisChannel {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        // MultiplexedConnection is a cheap clone over one shared pipe.
        let mut conn = self.publish_conn.clone();
        conn.publish::<_, _, ()>(channel, payload)
            .await
            .map_err(channel_error)
    }

    async fn subscribe(&self, channel: &str) -> Result<Box<dyn MessageStream>> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(channel_error)?;
        pubsub.subscribe(channel).await.map_err(channel_error)?;

        Ok(Box::new(RedisSubscription {
            stream: Box::pin(pubsub.into_on_message()),
            // The redis crate consumes the SUBSCRIBE acknowledgement
            // internally; surface it as the first stream event so the
            // bridge state machine observes it.
            pending_ack: true,
        }))
    }
}

struct RedisSubscription {
    stream: Pin<Box<dyn futures::Stream<Item = redis::Msg> + Send>>,
    pending_ack: bool,
}

#[async_trait]
impl MessageStream for RedisSubscription {
    async fn next_event(&mut self) -> Result<ChannelEvent> {
        if self.pending_ack {
            self.pending_ack = false;
            return Ok(ChannelEvent::Subscription { count: 1 });
        }

        match self.stream.next().await {
            Some(msg) => Ok(ChannelEvent::Message(msg.get_payload_bytes().to_vec())),
            None => Err(Error::Channel("subscribe connection closed".into())),
        }
    }
}
