//! Host bridge for opening entities outside the dashboard.
//!
//! The embedding host (desktop shell, script, test) decides what "open"
//! means. [`LogBridge`] is the default and only records the request.

use crate::model::EntityId;

pub trait HostBridge {
    fn open_task(&self, id: &EntityId);
    fn open_contact(&self, name: &str);
    fn open_schedule(&self, id: &EntityId);
}

/// Bridge that logs open requests and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBridge;

impl HostBridge for LogBridge {
    fn open_task(&self, id: &EntityId) {
        tracing::info!(%id, "open task requested");
    }

    fn open_contact(&self, name: &str) {
        tracing::info!(name, "open contact requested");
    }

    fn open_schedule(&self, id: &EntityId) {
        tracing::info!(%id, "open schedule requested");
    }
}
