use std::fmt::Display;

/// Label rendered next to the invoice link.
pub const INVOICE_LINK_LABEL: &str = "Click here to pay";

/// Snapshot of what the status panel currently shows.
///
/// `status_text` and `invoice_url` keep their last value while the panel is
/// hidden, the same way the page keeps the popup contents when it is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    pub visible: bool,
    pub status_text: Option<String>,
    pub invoice_url: Option<String>,
    pub alert: Option<String>,
}

impl PanelState {
    /// Text shown in the status region for a given status label.
    pub fn status_line(status: &str) -> String {
        format!("Status: {status}")
    }
}

impl Display for PanelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(alert) = &self.alert {
            writeln!(f, "! {alert}")?;
        }
        if !self.visible {
            return write!(f, "[panel hidden]");
        }
        writeln!(f, "+--- order status ---")?;
        if let Some(text) = &self.status_text {
            writeln!(f, "| {text}")?;
        }
        if let Some(url) = &self.invoice_url {
            writeln!(f, "| {INVOICE_LINK_LABEL}: {url}")?;
        }
        write!(f, "+--------------------")
    }
}
