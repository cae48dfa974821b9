use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[derive(Debug, Error, Clone)]
pub enum BusError {
    #[error("no active subscribers")]
    NoSubscribers,
}

/// Outbound boundary of the engine: one call per finished event, nothing
/// returned. Delivery failures are swallowed by the implementation.
pub trait EventSink<T>: Send + Sync {
    fn emit(&self, event: T);
}

impl<T, S> EventSink<T> for Arc<S>
where
    S: EventSink<T> + ?Sized,
{
    fn emit(&self, event: T) {
        (**self).emit(event)
    }
}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), BusError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Simple in-memory bus backed by a broadcast channel.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }

    fn send(&self, event: E) -> Result<(), BusError> {
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|_| BusError::NoSubscribers)
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), BusError> {
        self.send(event)
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

impl<E, T> EventSink<T> for InMemoryBus<E>
where
    E: Event,
    T: Into<E>,
{
    fn emit(&self, event: T) {
        if let Err(err) = self.send(event.into()) {
            debug!(target: "docwatch.bus", %err, "event dropped");
        }
    }
}
