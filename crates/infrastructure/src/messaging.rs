use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use signage_domain::{MessagingClient, WeatherUpdate};
use signage_errors::{SignageError, SignageResult};
use tokio::sync::broadcast;
use tracing::{debug, info};

const DEFAULT_CAPACITY: usize = 64;

/// In-process push channel. Updates are only delivered for locations some
/// widget subscribed to.
#[derive(Debug)]
pub struct BroadcastMessagingClient {
    sender: broadcast::Sender<WeatherUpdate>,
    subscriptions: RwLock<HashSet<String>>,
}

impl BroadcastMessagingClient {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: RwLock::new(HashSet::new()),
        }
    }

    pub fn is_subscribed(&self, location: &str) -> bool {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(location)
    }

    /// Announce fresh weather for `location`. Returns the number of
    /// listeners that received it.
    pub fn publish_weather_update(&self, location: &str) -> usize {
        if !self.is_subscribed(location) {
            debug!("Dropping weather update for unsubscribed location {}", location);
            return 0;
        }

        let update = WeatherUpdate {
            location: location.to_string(),
        };
        match self.sender.send(update) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("No listeners for weather update {}", location);
                0
            }
        }
    }
}

impl Default for BroadcastMessagingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingClient for BroadcastMessagingClient {
    fn weather_updates(&self) -> broadcast::Receiver<WeatherUpdate> {
        self.sender.subscribe()
    }

    async fn subscribe_to_weather(&self, location: &str) -> SignageResult<()> {
        if location.trim().is_empty() {
            return Err(SignageError::Subscription(
                "weather location must not be empty".to_string(),
            ));
        }

        let added = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.to_string());
        if added {
            info!("Subscribed to weather updates for {}", location);
        }
        Ok(())
    }
}
