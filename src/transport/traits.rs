//! Transport boundary traits and delivery types

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc::UnboundedReceiver;

use super::error::TransportResult;

/// A connected transport that can open channels.
///
/// Transports are explicitly constructed and passed around by `Arc`; there
/// is no process-wide instance. `close` ends every attached delivery
/// stream.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open_channel(&self) -> TransportResult<Box<dyn Channel>>;

    async fn close(&self) -> TransportResult<()>;
}

/// One transport channel.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Hand one encoded message to the broker side.
    ///
    /// Exactly one send per publisher invocation; retries, if any, are the
    /// transport's own business.
    async fn send(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: Bytes,
        content_type: Option<String>,
    ) -> TransportResult<()>;

    /// Attach the consumer for a queue and return its delivery stream.
    async fn consume(&self, queue: &str) -> TransportResult<DeliveryStream>;
}

/// Settles deliveries back to the transport that produced them.
///
/// Implemented by transports; handler code only sees
/// [`RawDelivery::ack`] / [`RawDelivery::nack`].
#[async_trait]
pub trait Acker: Send + Sync {
    async fn ack(self: Box<Self>, delivery: RawDelivery) -> TransportResult<()>;

    async fn nack(self: Box<Self>, delivery: RawDelivery, requeue: bool) -> TransportResult<()>;
}

/// One raw delivery pulled from a queue's stream.
///
/// Carries the encoded payload plus routing metadata and a monotonically
/// increasing per-queue sequence number. Dropping a delivery without
/// settling it neither acknowledges nor requeues it.
pub struct RawDelivery {
    pub queue: String,
    pub routing_key: String,
    pub payload: Bytes,
    pub content_type: Option<String>,
    pub sequence: u64,
    /// How many times this delivery has been requeued before.
    pub redelivery_count: u32,
    acker: Option<Box<dyn Acker>>,
}

impl RawDelivery {
    pub fn new(
        queue: impl Into<String>,
        routing_key: impl Into<String>,
        payload: Bytes,
        content_type: Option<String>,
        sequence: u64,
        redelivery_count: u32,
        acker: Box<dyn Acker>,
    ) -> Self {
        Self {
            queue: queue.into(),
            routing_key: routing_key.into(),
            payload,
            content_type,
            sequence,
            redelivery_count,
            acker: Some(acker),
        }
    }

    /// Acknowledge successful processing.
    pub async fn ack(mut self) -> TransportResult<()> {
        match self.acker.take() {
            Some(acker) => acker.ack(self).await,
            None => Ok(()),
        }
    }

    /// Reject the delivery, optionally asking the transport to requeue it
    /// for redelivery per its own policy.
    pub async fn nack(mut self, requeue: bool) -> TransportResult<()> {
        match self.acker.take() {
            Some(acker) => acker.nack(self, requeue).await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RawDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDelivery")
            .field("queue", &self.queue)
            .field("routing_key", &self.routing_key)
            .field("payload_len", &self.payload.len())
            .field("content_type", &self.content_type)
            .field("sequence", &self.sequence)
            .field("redelivery_count", &self.redelivery_count)
            .finish()
    }
}

/// Stream of raw deliveries for one queue.
///
/// Ends (`None`) when the transport side closes. Waiting on the next
/// delivery is the consume loop's single suspension point.
#[derive(Debug)]
pub struct DeliveryStream {
    queue: String,
    inner: UnboundedReceiver<RawDelivery>,
}

impl DeliveryStream {
    pub fn new(queue: impl Into<String>, inner: UnboundedReceiver<RawDelivery>) -> Self {
        Self {
            queue: queue.into(),
            inner,
        }
    }

    /// The queue this stream consumes from.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Wait for the next delivery, or `None` once the transport closed.
    pub async fn next_delivery(&mut self) -> Option<RawDelivery> {
        self.inner.recv().await
    }
}

impl Stream for DeliveryStream {
    type Item = RawDelivery;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<RawDelivery>> {
        self.inner.poll_recv(cx)
    }
}
