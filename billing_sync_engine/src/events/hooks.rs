use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EntityKind, EventHandler, EventProducer, Handler, SyncAction, SyncEvent};
use serde::Serialize;

/// The producer side of the event channel, cloned into the sync API. Publishing with no registered hooks is a no-op;
/// the engine never requires a subscriber.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub sync_event_producers: Vec<EventProducer<SyncEvent>>,
}

impl EventProducers {
    pub(crate) async fn emit(&self, entity: EntityKind, action: SyncAction, payload: impl Serialize) {
        if self.sync_event_producers.is_empty() {
            return;
        }
        let event = SyncEvent::new(entity, action, payload);
        for producer in &self.sync_event_producers {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_event: Option<EventHandler<SyncEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_event = hooks.on_event.map(|f| EventHandler::new(buffer_size, f));
        Self { on_event }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_event {
            result.sync_event_producers.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_event {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_event: Option<Handler<SyncEvent>>,
}

impl EventHooks {
    pub fn on_event<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SyncEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_event = Some(Arc::new(f));
        self
    }
}
