//! Simple stateless pub-sub event channel.
//!
//! Engine components publish [`SyncEvent`](super::SyncEvent)s through cloned producers; a single handler task drains
//! the channel and runs the subscriber hook for each event. Handlers are stateless: all they receive is the event
//! itself, though they can be async.

use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs the handler loop until every producer has been dropped. Events are handled one at a time, in the order
    /// they were published.
    pub async fn start_handler(mut self) {
        debug!("📨 Starting event handler");
        // drop the internal sender so that when the last producer is dropped the loop terminates on its own
        drop(self.sender);
        while let Some(ev) = self.listener.recv().await {
            trace!("📨 Handling event");
            (self.handler)(ev).await;
        }
        debug!("📨 Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📨 Failed to send event: {e}");
        }
    }
}
