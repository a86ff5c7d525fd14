use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::config::AppConfig;

use super::events::{AppEvent, Notification, NotificationLevel};

/// Centralized handle to everything the views need from the outside.
///
/// Created once at startup, then passed by reference to views. The API
/// client is cheap to clone into spawned request tasks.
pub struct Services {
    pub api: ApiClient,
    /// Identity sent with chat and agent requests. Hardcoded default
    /// ("demo") unless overridden in config; there is no authentication.
    pub user: String,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    pub fn new(config: &AppConfig, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        log::info!("Backend base URL: {}", config.backend.base_url);
        Self {
            api: ApiClient::new(config.backend.base_url.clone()),
            user: config.backend.user.clone(),
            event_tx,
        }
    }

    /// Push a notification into the event loop. Delivery failure only
    /// happens during shutdown and is ignored.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        let _ = self.event_tx.send(AppEvent::Notification(Notification {
            id: 0, // assigned by AppState
            message: message.into(),
            level,
            ttl_ticks: 100,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_from_config() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let services = Services::new(&AppConfig::default(), tx);
        assert_eq!(services.api.base_url(), "http://localhost:8000");
        assert_eq!(services.user, "demo");
    }

    #[test]
    fn test_notify_delivers_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let services = Services::new(&AppConfig::default(), tx);
        services.notify(NotificationLevel::Success, "uploaded");
        match rx.try_recv() {
            Ok(AppEvent::Notification(n)) => {
                assert_eq!(n.message, "uploaded");
                assert_eq!(n.level, NotificationLevel::Success);
            }
            other => panic!("expected notification, got {other:?}"),
        }
    }
}
