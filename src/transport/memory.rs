//! In-process transport backed by per-queue channels
//!
//! Applies the router's matching at send time and buffers each queue in an
//! unbounded channel, so the full publish/consume pipeline runs without an
//! external broker process. Per-queue sequence numbers are assigned here;
//! a delivery that is nack'd with requeue goes back to its queue until the
//! configured redelivery cap is reached, then it is dropped with a warning.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::core::sync::{handle_rwlock_read, handle_rwlock_write};
use crate::routing::Router;

use super::error::{TransportError, TransportResult};
use super::traits::{Acker, Channel, DeliveryStream, RawDelivery, Transport};

/// Tuning for the in-memory transport.
#[derive(Debug, Clone)]
pub struct MemoryTransportConfig {
    /// How many times a nack'd delivery is requeued before being dropped.
    pub max_redeliveries: u32,
}

impl Default for MemoryTransportConfig {
    fn default() -> Self {
        Self { max_redeliveries: 3 }
    }
}

/// Per-queue buffer plus its sequence counter.
///
/// The sequence counter is shared between slot generations, so detaching
/// and reattaching a consumer never resets the numbering.
struct QueueSlot {
    sender: UnboundedSender<RawDelivery>,
    receiver: Option<UnboundedReceiver<RawDelivery>>,
    next_sequence: Arc<AtomicU64>,
}

impl QueueSlot {
    fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            sender,
            receiver: Some(receiver),
            // Sequences start at 1, following the usual log convention
            next_sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Replace the channel pair after the previous consumer went away.
    fn reset(&mut self) {
        let (sender, receiver) = unbounded_channel();
        self.sender = sender;
        self.receiver = Some(receiver);
    }
}

struct MemoryTransportInner {
    router: Arc<Router>,
    config: MemoryTransportConfig,
    queues: RwLock<HashMap<String, QueueSlot>>,
    closed: AtomicBool,
}

impl MemoryTransportInner {
    fn send(
        this: &Arc<Self>,
        exchange: &str,
        routing_key: &str,
        payload: Bytes,
        content_type: Option<String>,
    ) -> TransportResult<()> {
        if this.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        let queues = this
            .router
            .route(exchange, routing_key)
            .map_err(|err| TransportError::Send {
                message: err.to_string(),
            })?;

        for queue in queues {
            Self::enqueue(
                this,
                &queue,
                routing_key,
                payload.clone(),
                content_type.clone(),
                0,
                None,
            )?;
        }
        Ok(())
    }

    /// Buffer one delivery for a queue, creating the slot on first use.
    ///
    /// `sequence` is `None` for fresh sends and carries the original number
    /// on redelivery, since a requeued message is still the same message.
    fn enqueue(
        this: &Arc<Self>,
        queue: &str,
        routing_key: &str,
        payload: Bytes,
        content_type: Option<String>,
        redelivery_count: u32,
        sequence: Option<u64>,
    ) -> TransportResult<()> {
        // Fast path: slot exists and its consumer side is still alive
        {
            let slots = handle_rwlock_read(this.queues.read(), |message| TransportError::Send {
                message,
            })?;
            if let Some(slot) = slots.get(queue) {
                if !slot.sender.is_closed() {
                    let sender = slot.sender.clone();
                    let next_sequence = slot.next_sequence.clone();
                    drop(slots);
                    return Self::push(
                        this,
                        sender,
                        next_sequence,
                        queue,
                        routing_key,
                        payload,
                        content_type,
                        redelivery_count,
                        sequence,
                    );
                }
            }
        }

        let mut slots = handle_rwlock_write(this.queues.write(), |message| TransportError::Send {
            message,
        })?;
        let slot = slots.entry(queue.to_string()).or_insert_with(QueueSlot::new);
        if slot.sender.is_closed() {
            // The previous consumer detached and dropped its receiver
            slot.reset();
        }
        let sender = slot.sender.clone();
        let next_sequence = slot.next_sequence.clone();
        drop(slots);
        Self::push(
            this,
            sender,
            next_sequence,
            queue,
            routing_key,
            payload,
            content_type,
            redelivery_count,
            sequence,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        this: &Arc<Self>,
        sender: UnboundedSender<RawDelivery>,
        next_sequence: Arc<AtomicU64>,
        queue: &str,
        routing_key: &str,
        payload: Bytes,
        content_type: Option<String>,
        redelivery_count: u32,
        sequence: Option<u64>,
    ) -> TransportResult<()> {
        let sequence =
            sequence.unwrap_or_else(|| next_sequence.fetch_add(1, Ordering::SeqCst));
        let delivery = RawDelivery::new(
            queue,
            routing_key,
            payload,
            content_type,
            sequence,
            redelivery_count,
            Box::new(MemoryAcker {
                inner: Arc::downgrade(this),
            }),
        );
        sender.send(delivery).map_err(|_| TransportError::Send {
            message: format!("queue '{}' buffer is closed", queue),
        })
    }

    fn consume(&self, queue: &str) -> TransportResult<DeliveryStream> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        let mut slots = handle_rwlock_write(self.queues.write(), |message| {
            TransportError::Consume {
                queue: queue.to_string(),
                message,
            }
        })?;
        let slot = slots.entry(queue.to_string()).or_insert_with(QueueSlot::new);
        if slot.receiver.is_none() && slot.sender.is_closed() {
            // Previous consumer detached; messages it left unread are gone
            slot.reset();
        }
        match slot.receiver.take() {
            Some(receiver) => Ok(DeliveryStream::new(queue, receiver)),
            None => Err(TransportError::ConsumerAttached {
                queue: queue.to_string(),
            }),
        }
    }

    fn close(&self) -> TransportResult<()> {
        self.closed.store(true, Ordering::Release);
        let mut slots = handle_rwlock_write(self.queues.write(), |message| {
            TransportError::Send { message }
        })?;
        // Dropping the senders ends every attached delivery stream
        slots.clear();
        log::debug!("In-memory transport closed");
        Ok(())
    }
}

struct MemoryAcker {
    inner: Weak<MemoryTransportInner>,
}

#[async_trait]
impl Acker for MemoryAcker {
    async fn ack(self: Box<Self>, _delivery: RawDelivery) -> TransportResult<()> {
        // Nothing to retract; the delivery was already removed from the
        // buffer when it was pulled.
        Ok(())
    }

    async fn nack(self: Box<Self>, delivery: RawDelivery, requeue: bool) -> TransportResult<()> {
        if !requeue {
            return Ok(());
        }
        let Some(inner) = self.inner.upgrade() else {
            return Err(TransportError::Closed);
        };
        if delivery.redelivery_count >= inner.config.max_redeliveries {
            log::warn!(
                "Dropping delivery {} for queue '{}' after {} redeliveries",
                delivery.sequence,
                delivery.queue,
                delivery.redelivery_count
            );
            return Ok(());
        }
        MemoryTransportInner::enqueue(
            &inner,
            &delivery.queue,
            &delivery.routing_key,
            delivery.payload.clone(),
            delivery.content_type.clone(),
            delivery.redelivery_count + 1,
            Some(delivery.sequence),
        )
    }
}

/// In-process [`Transport`] for broker-less operation and tests.
///
/// # Example
///
/// ```rust,no_run
/// use relaymq::routing::Router;
/// use relaymq::topology::{ExchangeKind, Topology};
/// use relaymq::transport::{InMemoryTransport, Transport};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let topology = Arc::new(Topology::new());
/// topology.declare_exchange("orders", ExchangeKind::Topic)?;
///
/// let transport = InMemoryTransport::new(Arc::new(Router::new(topology)));
/// let channel = transport.open_channel().await?;
/// # let _ = channel;
/// # Ok(())
/// # }
/// ```
pub struct InMemoryTransport {
    inner: Arc<MemoryTransportInner>,
}

impl InMemoryTransport {
    pub fn new(router: Arc<Router>) -> Self {
        Self::with_config(router, MemoryTransportConfig::default())
    }

    pub fn with_config(router: Arc<Router>, config: MemoryTransportConfig) -> Self {
        Self {
            inner: Arc::new(MemoryTransportInner {
                router,
                config,
                queues: RwLock::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn open_channel(&self) -> TransportResult<Box<dyn Channel>> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        Ok(Box::new(MemoryChannel {
            inner: self.inner.clone(),
        }))
    }

    async fn close(&self) -> TransportResult<()> {
        self.inner.close()
    }
}

struct MemoryChannel {
    inner: Arc<MemoryTransportInner>,
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn send(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: Bytes,
        content_type: Option<String>,
    ) -> TransportResult<()> {
        MemoryTransportInner::send(&self.inner, exchange, routing_key, payload, content_type)
    }

    async fn consume(&self, queue: &str) -> TransportResult<DeliveryStream> {
        self.inner.consume(queue)
    }
}
