//! Event publication on the message bus

use std::sync::Mutex;

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Fire-and-forget publisher. Delivery failures are logged, never returned.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, payload: Value);
}

/// Serialize `event` and hand it to `publisher`
pub fn emit<T: Serialize>(publisher: &dyn EventPublisher, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => publisher.publish(topic, payload),
        Err(e) => tracing::error!("Failed to serialize event for {}: {}", topic, e),
    }
}

/// Redis pub/sub publisher
#[derive(Clone)]
pub struct RedisEventPublisher {
    connection: ConnectionManager,
}

impl RedisEventPublisher {
    /// Connect to Redis and check the connection
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut connection)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { connection })
    }
}

impl EventPublisher for RedisEventPublisher {
    fn publish(&self, topic: &str, payload: Value) {
        let mut connection = self.connection.clone();
        let topic = topic.to_string();
        let message = payload.to_string();
        tokio::spawn(async move {
            match connection.publish::<_, _, i64>(&topic, message).await {
                Ok(receivers) => tracing::debug!("Published on {} to {} subscribers", topic, receivers),
                Err(e) => tracing::error!("Failed to publish on {}: {}", topic, e),
            }
        });
    }
}

/// Publisher keeping every event in memory, in publication order
#[derive(Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<(String, Value)>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Payloads published on `topic`
    pub fn on(&self, topic: &str) -> Vec<Value> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| payload)
            .collect()
    }
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, topic: &str, payload: Value) {
        tracing::debug!("Recorded event on {}", topic);
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((topic.to_string(), payload));
    }
}
