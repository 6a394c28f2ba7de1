//! Inbound Ports (Driving Ports)
//!
//! What the shell's router calls.

use async_trait::async_trait;

use crate::domain::RouteView;

/// Composition host API (Driving Port)
#[async_trait]
pub trait CompositionApi: Send + Sync {
    /// Navigate the outlet to `path`, loading and mounting as needed.
    ///
    /// Never fails: load and mount failures render as `RouteView::Error`
    /// for that route only.
    async fn navigate(&self, path: &str) -> RouteView;

    /// What the outlet currently shows.
    fn view(&self) -> RouteView;

    /// Unmount the active fragment, if any. Returns whether one was mounted.
    fn unmount(&self) -> bool;

    /// Unmount and release every retained background subscription.
    fn shutdown(&self);

    /// Prefix of the mounted route.
    fn active_route(&self) -> Option<String>;
}
