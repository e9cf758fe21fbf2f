//! Listener container owning per-queue consume loops

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use strum_macros::Display;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::codec::Codec;
use crate::transport::{Channel, RawDelivery};

use super::config::{DecodeFailurePolicy, ListenerConfig};
use super::error::{ListenerError, ListenerResult};
use super::traits::{DeliveryFault, FaultHandler, LogFaultHandler, MessageHandler};
use super::Delivery;

/// Container lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ContainerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Handle returned by [`ListenerContainer::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerRegistration {
    queue: String,
}

impl ListenerRegistration {
    pub fn queue(&self) -> &str {
        &self.queue
    }
}

struct Lifecycle {
    state: ContainerState,
    shutdown: Option<watch::Sender<bool>>,
    loops: Vec<(String, JoinHandle<()>)>,
}

/// Owns the consume loops for a set of queues.
///
/// The container is generic over the decoded payload type and the codec
/// that produces it: one container per payload type, any number of queues
/// per container. Lifecycle follows
/// `Stopped -> Starting -> Running -> Stopping -> Stopped`; concurrent
/// `start()`/`stop()` calls are serialized.
///
/// # Thread Safety
///
/// All operations take `&self`; the container can be shared across tasks
/// as `Arc<ListenerContainer<_, _>>`.
pub struct ListenerContainer<T, C> {
    channel: Arc<dyn Channel>,
    codec: Arc<C>,
    config: ListenerConfig,
    fault_handler: Arc<dyn FaultHandler>,
    handlers: RwLock<HashMap<String, Arc<dyn MessageHandler<T>>>>,
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,
    lifecycle: Mutex<Lifecycle>,
}

impl<T, C> ListenerContainer<T, C>
where
    T: Send + 'static,
    C: Codec<T> + 'static,
{
    pub fn new(channel: Arc<dyn Channel>, codec: C) -> Self {
        Self::with_config(channel, codec, ListenerConfig::default())
    }

    pub fn with_config(channel: Arc<dyn Channel>, codec: C, config: ListenerConfig) -> Self {
        Self {
            channel,
            codec: Arc::new(codec),
            config,
            fault_handler: Arc::new(LogFaultHandler),
            handlers: RwLock::new(HashMap::new()),
            counters: RwLock::new(HashMap::new()),
            lifecycle: Mutex::new(Lifecycle {
                state: ContainerState::Stopped,
                shutdown: None,
                loops: Vec::new(),
            }),
        }
    }

    /// Replace the default logging fault handler.
    pub fn fault_handler(mut self, fault_handler: Arc<dyn FaultHandler>) -> Self {
        self.fault_handler = fault_handler;
        self
    }

    /// Register a handler for a queue and return its handle.
    ///
    /// Registrations are picked up by the next `start()`; registering
    /// while running takes effect only after a restart. Re-registering a
    /// queue replaces its handler.
    pub fn register(
        &self,
        queue: &str,
        handler: Arc<dyn MessageHandler<T>>,
    ) -> ListenerRegistration {
        self.handlers
            .write()
            .unwrap()
            .insert(queue.to_string(), handler);
        self.counters
            .write()
            .unwrap()
            .entry(queue.to_string())
            .or_default();
        log::debug!("Registered handler for queue '{}'", queue);
        ListenerRegistration {
            queue: queue.to_string(),
        }
    }

    /// Remove a registration. Takes effect at the next `start()`.
    pub fn deregister(&self, registration: &ListenerRegistration) {
        self.handlers.write().unwrap().remove(&registration.queue);
        log::debug!("Deregistered handler for queue '{}'", registration.queue);
    }

    /// Deliveries successfully handled for a queue since the container was
    /// created. Counts survive restarts.
    pub fn delivery_count(&self, queue: &str) -> u64 {
        self.counters
            .read()
            .unwrap()
            .get(queue)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ContainerState {
        self.lifecycle.lock().await.state
    }

    /// Start one consume loop per registered queue.
    ///
    /// Fails with [`ListenerError::AlreadyRunning`] unless the container is
    /// stopped. A transport failure while attaching consumers rolls the
    /// container back to stopped.
    pub async fn start(&self) -> ListenerResult<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.state != ContainerState::Stopped {
            return Err(ListenerError::AlreadyRunning);
        }
        lifecycle.state = ContainerState::Starting;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let registrations: Vec<(String, Arc<dyn MessageHandler<T>>)> = self
            .handlers
            .read()
            .unwrap()
            .iter()
            .map(|(queue, handler)| (queue.clone(), handler.clone()))
            .collect();

        let mut loops: Vec<(String, JoinHandle<()>)> = Vec::with_capacity(registrations.len());
        for (queue, handler) in registrations {
            let stream = match self.channel.consume(&queue).await {
                Ok(stream) => stream,
                Err(err) => {
                    // Roll back whatever was already spawned
                    let _ = shutdown_tx.send(true);
                    for (_, handle) in loops {
                        handle.abort();
                    }
                    lifecycle.state = ContainerState::Stopped;
                    return Err(ListenerError::Transport(err));
                }
            };
            let counter = self
                .counters
                .write()
                .unwrap()
                .entry(queue.clone())
                .or_default()
                .clone();
            let consume_loop = ConsumeLoop {
                queue: queue.clone(),
                stream,
                handler,
                codec: self.codec.clone(),
                channel: self.channel.clone(),
                policy: self.config.decode_failure.clone(),
                fault_handler: self.fault_handler.clone(),
                counter,
                shutdown: shutdown_rx.clone(),
            };
            loops.push((queue, tokio::spawn(consume_loop.run())));
        }

        lifecycle.shutdown = Some(shutdown_tx);
        lifecycle.loops = loops;
        lifecycle.state = ContainerState::Running;
        log::info!(
            "Listener container running with {} consume loop(s)",
            lifecycle.loops.len()
        );
        Ok(())
    }

    /// Signal every loop to exit after its in-flight delivery completes.
    ///
    /// The drain is bounded by the configured `drain_timeout`; a loop still
    /// running at the deadline is aborted with a warning. Fails with
    /// [`ListenerError::NotRunning`] unless the container is running.
    pub async fn stop(&self) -> ListenerResult<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.state != ContainerState::Running {
            return Err(ListenerError::NotRunning);
        }
        lifecycle.state = ContainerState::Stopping;

        if let Some(shutdown) = lifecycle.shutdown.take() {
            let _ = shutdown.send(true);
        }
        for (queue, mut handle) in lifecycle.loops.drain(..) {
            match tokio::time::timeout(self.config.drain_timeout, &mut handle).await {
                Ok(_) => {}
                Err(_) => {
                    log::warn!(
                        "Consume loop for queue '{}' did not drain within {:?}; aborting",
                        queue,
                        self.config.drain_timeout
                    );
                    handle.abort();
                }
            }
        }

        lifecycle.state = ContainerState::Stopped;
        log::info!("Listener container stopped");
        Ok(())
    }
}

/// State owned by one spawned consume loop.
struct ConsumeLoop<T, C> {
    queue: String,
    stream: crate::transport::DeliveryStream,
    handler: Arc<dyn MessageHandler<T>>,
    codec: Arc<C>,
    channel: Arc<dyn Channel>,
    policy: DecodeFailurePolicy,
    fault_handler: Arc<dyn FaultHandler>,
    counter: Arc<AtomicU64>,
    shutdown: watch::Receiver<bool>,
}

impl<T, C> ConsumeLoop<T, C>
where
    T: Send + 'static,
    C: Codec<T>,
{
    async fn run(mut self) {
        log::debug!("Consume loop for queue '{}' started", self.queue);
        loop {
            // The pull is the only point that observes shutdown; an
            // in-flight delivery always completes before the loop exits.
            let raw = tokio::select! {
                _ = self.shutdown.changed() => break,
                next = self.stream.next_delivery() => match next {
                    Some(raw) => raw,
                    None => {
                        self.fault_handler.on_fault(DeliveryFault::Transport {
                            queue: self.queue.clone(),
                            source: None,
                        });
                        return;
                    }
                },
            };
            self.process(raw).await;
        }
        log::debug!("Consume loop for queue '{}' drained", self.queue);
    }

    async fn process(&self, raw: RawDelivery) {
        match self.codec.decode(&raw.payload) {
            Err(err) => {
                self.fault_handler.on_fault(DeliveryFault::Decode {
                    queue: self.queue.clone(),
                    sequence: raw.sequence,
                    source: err,
                });
                self.discard(raw).await;
            }
            Ok(message) => {
                let delivery = Delivery {
                    queue: raw.queue.clone(),
                    routing_key: raw.routing_key.clone(),
                    sequence: raw.sequence,
                    redelivery_count: raw.redelivery_count,
                    message,
                };
                match self.handler.handle(delivery).await {
                    Ok(()) => {
                        self.counter.fetch_add(1, Ordering::Relaxed);
                        if let Err(err) = raw.ack().await {
                            log::warn!("Ack failed on queue '{}': {}", self.queue, err);
                        }
                    }
                    Err(err) => {
                        self.fault_handler.on_fault(DeliveryFault::Handler {
                            queue: self.queue.clone(),
                            sequence: raw.sequence,
                            source: err,
                        });
                        if let Err(err) = raw.nack(true).await {
                            log::warn!("Nack failed on queue '{}': {}", self.queue, err);
                        }
                    }
                }
            }
        }
    }

    /// Apply the decode-failure policy. Undecodable payloads are never
    /// requeued; redelivery would fail the same way forever.
    async fn discard(&self, raw: RawDelivery) {
        if let DecodeFailurePolicy::DeadLetter {
            exchange,
            routing_key,
        } = &self.policy
        {
            if let Err(err) = self
                .channel
                .send(
                    exchange,
                    routing_key,
                    raw.payload.clone(),
                    raw.content_type.clone(),
                )
                .await
            {
                log::warn!(
                    "Dead-letter forward failed for queue '{}': {}",
                    self.queue,
                    err
                );
            }
        }
        if let Err(err) = raw.ack().await {
            log::warn!("Ack failed on queue '{}': {}", self.queue, err);
        }
    }
}
