//! Tests for container lifecycle transitions

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::codec::TextCodec;
    use crate::core::coordinator::DeliveryCoordinator;
    use crate::listener::{
        handler_fn, ContainerState, Delivery, ListenerConfig, ListenerContainer, ListenerError,
    };
    use crate::publish::Publisher;
    use crate::routing::Router;
    use crate::topology::{ExchangeKind, Topology};
    use crate::transport::{Channel, InMemoryTransport, Transport};

    async fn channel_and_publisher() -> (Arc<dyn Channel>, Publisher<String, TextCodec>) {
        let topology = Arc::new(Topology::new());
        topology.declare_exchange("work", ExchangeKind::Topic).unwrap();
        topology.declare_queue("tasks").unwrap();
        topology.bind("work", "tasks", "work.#").unwrap();
        let router = Arc::new(Router::new(topology));
        let transport = InMemoryTransport::new(router.clone());
        let channel: Arc<dyn Channel> = Arc::from(transport.open_channel().await.unwrap());
        let publisher = Publisher::new(channel.clone(), router, TextCodec);
        (channel, publisher)
    }

    fn noop_container(channel: Arc<dyn Channel>) -> ListenerContainer<String, TextCodec> {
        let container = ListenerContainer::new(channel, TextCodec);
        container.register(
            "tasks",
            Arc::new(handler_fn(|_delivery: Delivery<String>| async move { Ok(()) })),
        );
        container
    }

    #[tokio::test]
    async fn test_state_transitions_through_lifecycle() {
        let (channel, _publisher) = channel_and_publisher().await;
        let container = noop_container(channel);

        assert_eq!(container.state().await, ContainerState::Stopped);
        container.start().await.unwrap();
        assert_eq!(container.state().await, ContainerState::Running);
        container.stop().await.unwrap();
        assert_eq!(container.state().await, ContainerState::Stopped);
    }

    #[tokio::test]
    async fn test_start_while_running_fails() {
        let (channel, _publisher) = channel_and_publisher().await;
        let container = noop_container(channel);

        container.start().await.unwrap();
        match container.start().await {
            Err(ListenerError::AlreadyRunning) => {}
            other => panic!("Expected AlreadyRunning, got: {:?}", other),
        }
        container.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_while_stopped_fails() {
        let (channel, _publisher) = channel_and_publisher().await;
        let container = noop_container(channel);

        match container.stop().await {
            Err(ListenerError::NotRunning) => {}
            other => panic!("Expected NotRunning, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_drains_in_flight_delivery() {
        let (channel, publisher) = channel_and_publisher().await;

        let started = Arc::new(DeliveryCoordinator::new(1));
        let container = ListenerContainer::new(channel, TextCodec);
        let handler_started = started.clone();
        container.register(
            "tasks",
            Arc::new(handler_fn(move |_delivery: Delivery<String>| {
                let handler_started = handler_started.clone();
                async move {
                    handler_started.signal();
                    // Simulate slow processing; stop() must wait this out
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    Ok(())
                }
            })),
        );
        container.start().await.unwrap();

        publisher.publish("work", "work.1", &"x".to_string()).await.unwrap();
        assert!(started.wait_for(Duration::from_secs(2)).await);

        // The handler is mid-flight now; a graceful stop completes it
        container.stop().await.unwrap();
        assert_eq!(container.delivery_count("tasks"), 1);
    }

    #[tokio::test]
    async fn test_stop_aborts_loops_that_exceed_drain_timeout() {
        let (channel, publisher) = channel_and_publisher().await;

        let started = Arc::new(DeliveryCoordinator::new(1));
        let config = ListenerConfig {
            drain_timeout: Duration::from_millis(50),
            ..ListenerConfig::default()
        };
        let container = ListenerContainer::with_config(channel, TextCodec, config);
        let handler_started = started.clone();
        container.register(
            "tasks",
            Arc::new(handler_fn(move |_delivery: Delivery<String>| {
                let handler_started = handler_started.clone();
                async move {
                    handler_started.signal();
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(())
                }
            })),
        );
        container.start().await.unwrap();

        publisher.publish("work", "work.1", &"x".to_string()).await.unwrap();
        assert!(started.wait_for(Duration::from_secs(2)).await);

        let before = tokio::time::Instant::now();
        container.stop().await.unwrap();
        assert!(before.elapsed() < Duration::from_secs(5));
        assert_eq!(container.state().await, ContainerState::Stopped);
        // The aborted delivery never completed
        assert_eq!(container.delivery_count("tasks"), 0);
    }

    #[tokio::test]
    async fn test_container_can_restart_and_resume_buffered_messages() {
        let (channel, publisher) = channel_and_publisher().await;

        let coordinator = Arc::new(DeliveryCoordinator::new(1));
        let container = ListenerContainer::new(channel, TextCodec);
        let signal = coordinator.clone();
        container.register(
            "tasks",
            Arc::new(handler_fn(move |_delivery: Delivery<String>| {
                let signal = signal.clone();
                async move {
                    signal.signal();
                    Ok(())
                }
            })),
        );

        container.start().await.unwrap();
        container.stop().await.unwrap();

        // Published while no loop is pulling; buffered by the transport
        publisher.publish("work", "work.1", &"x".to_string()).await.unwrap();

        container.start().await.unwrap();
        assert!(coordinator.wait_for(Duration::from_secs(2)).await);
        container.stop().await.unwrap();
        assert_eq!(container.delivery_count("tasks"), 1);
    }

    #[tokio::test]
    async fn test_deregistered_queue_gets_no_loop() {
        let (channel, publisher) = channel_and_publisher().await;
        let container = ListenerContainer::new(channel, TextCodec);
        let registration = container.register(
            "tasks",
            Arc::new(handler_fn(|_delivery: Delivery<String>| async move { Ok(()) })),
        );
        assert_eq!(registration.queue(), "tasks");
        container.deregister(&registration);

        container.start().await.unwrap();
        publisher.publish("work", "work.1", &"x".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        container.stop().await.unwrap();

        assert_eq!(container.delivery_count("tasks"), 0);
    }
}
