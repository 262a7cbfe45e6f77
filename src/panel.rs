//! # Status Panel
//!
//! The observable surface the widget renders into. Every write goes through a
//! `tokio::sync::watch` channel, so any number of observers (the terminal
//! front end, tests) see the latest [`PanelState`] and are woken on change.
//!
//! The panel is shared: the widget actor and the poll loop both hold a clone
//! and write to it directly.

use crate::model::PanelState;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct Panel {
    state: Arc<watch::Sender<PanelState>>,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(PanelState::default());
        Self {
            state: Arc::new(sender),
        }
    }

    /// Subscribe to panel changes.
    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.state.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> PanelState {
        self.state.borrow().clone()
    }

    pub fn show(&self) {
        self.state.send_if_modified(|s| !std::mem::replace(&mut s.visible, true));
    }

    pub fn hide(&self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.visible, false));
    }

    /// Renders `"Status: <status>"` into the status region and clears any alert.
    pub fn set_status(&self, status: &str) {
        let text = PanelState::status_line(status);
        self.state.send_modify(|s| {
            s.status_text = Some(text);
            s.alert = None;
        });
    }

    pub fn set_invoice_link(&self, url: &str) {
        self.state.send_modify(|s| s.invoice_url = Some(url.to_string()));
    }

    /// Clears the alert region, leaving status and link untouched.
    pub fn dismiss_alert(&self) {
        self.state.send_if_modified(|s| s.alert.take().is_some());
    }

    pub fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|s| s.alert = Some(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let panel = Panel::new();
        let mut rx = panel.subscribe();

        panel.show();
        panel.set_status("pending");
        rx.changed().await.unwrap();

        let state = rx.borrow_and_update().clone();
        assert!(state.visible);
        assert_eq!(state.status_text.as_deref(), Some("Status: pending"));
    }

    #[test]
    fn test_hide_keeps_contents() {
        let panel = Panel::new();
        panel.show();
        panel.set_status("pending");
        panel.set_invoice_link("http://pay/A1");
        panel.hide();

        let state = panel.snapshot();
        assert!(!state.visible);
        assert_eq!(state.status_text.as_deref(), Some("Status: pending"));
        assert_eq!(state.invoice_url.as_deref(), Some("http://pay/A1"));
    }

    #[test]
    fn test_status_clears_alert() {
        let panel = Panel::new();
        panel.alert("Status check failed");
        panel.set_status("UNPAID");
        assert_eq!(panel.snapshot().alert, None);
    }

    #[test]
    fn test_dismiss_alert_only_notifies_on_change() {
        let panel = Panel::new();
        let mut rx = panel.subscribe();

        panel.dismiss_alert();
        assert!(!rx.has_changed().unwrap());

        panel.set_status("UNPAID");
        panel.alert("Status check failed");
        rx.borrow_and_update();
        panel.dismiss_alert();
        assert!(rx.has_changed().unwrap());

        let state = panel.snapshot();
        assert_eq!(state.alert, None);
        assert_eq!(state.status_text.as_deref(), Some("Status: UNPAID"));
    }
}
