use std::sync::Arc;
use std::time::Duration;

use enhancer_core_types::{NotificationId, NotificationKind};
use tracing::debug;

use crate::HostPage;

pub const DEFAULT_NOTIFICATION_LIFETIME: Duration = Duration::from_millis(2500);

/// Shows transient notifications on the host page. Each one removes itself after `lifetime`.
///
/// Must be used from within a Tokio runtime.
#[derive(Clone)]
pub struct Notifier {
    page: Arc<dyn HostPage>,
    lifetime: Duration,
}

impl Notifier {
    pub fn new(page: Arc<dyn HostPage>, lifetime: Duration) -> Self {
        Self { page, lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn show(&self, message: &str, kind: NotificationKind) -> NotificationId {
        let id = self.page.append_notification(message, kind);
        debug!(kind = kind.name(), message, "notification shown");

        let page = self.page.clone();
        let lifetime = self.lifetime;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            page.remove_notification(id);
        });
        id
    }
}
