//! Publisher handle for sending messages

use std::marker::PhantomData;
use std::sync::Arc;

use crate::codec::Codec;
use crate::routing::Router;
use crate::transport::Channel;

use super::error::PublishResult;

/// Receipt for one accepted publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub exchange: String,
    pub routing_key: String,
    /// Queues the key matched at publish time. Zero means the message was
    /// accepted but unroutable and will be dropped by the broker side.
    pub matched_queues: usize,
}

/// Producer-side handle for publishing typed payloads.
///
/// The publisher validates that the exchange exists, encodes the payload
/// via its codec and performs exactly one transport send per invocation.
/// An unroutable routing key is not an error: the message is simply
/// dropped, and a warning is logged.
///
/// # Example
///
/// ```rust,no_run
/// # use relaymq::codec::TextCodec;
/// # use relaymq::publish::Publisher;
/// # async fn example(publisher: Publisher<String, TextCodec>) -> Result<(), Box<dyn std::error::Error>> {
/// let receipt = publisher
///     .publish("orders", "orders.123.paid", &"order 123 paid".to_string())
///     .await?;
/// println!("matched {} queue(s)", receipt.matched_queues);
/// # Ok(())
/// # }
/// ```
pub struct Publisher<T, C> {
    channel: Arc<dyn Channel>,
    router: Arc<Router>,
    codec: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> Publisher<T, C>
where
    C: Codec<T>,
{
    pub fn new(channel: Arc<dyn Channel>, router: Arc<Router>, codec: C) -> Self {
        Self {
            channel,
            router,
            codec,
            _marker: PhantomData,
        }
    }

    /// Publish one payload to an exchange under a routing key.
    ///
    /// Fails when the exchange is unknown, the payload does not encode, or
    /// the transport rejects the send. There is no retry here.
    pub async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &T,
    ) -> PublishResult<DeliveryReceipt> {
        let matched = self.router.route(exchange, routing_key)?;
        if matched.is_empty() {
            log::warn!(
                "Routing key '{}' matches no binding on exchange '{}'; message will be dropped",
                routing_key,
                exchange
            );
        }

        let payload = self.codec.encode(payload)?;
        self.channel
            .send(
                exchange,
                routing_key,
                payload,
                Some(self.codec.content_type().to_string()),
            )
            .await?;

        log::trace!(
            "Published to exchange '{}' with routing key '{}' ({} queue(s) matched)",
            exchange,
            routing_key,
            matched.len()
        );
        Ok(DeliveryReceipt {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            matched_queues: matched.len(),
        })
    }
}
