//! Wire types for the top-up order API.
//!
//! The backend owns these shapes; the widget only reads the fields it renders
//! and ignores everything else.
//!
//! ```rust
//! use topup_widget::model::{CreatedOrder, OrderId};
//!
//! let created: CreatedOrder =
//!     serde_json::from_str(r#"{"id": 42, "invoice_url": "http://pay/42"}"#).unwrap();
//! assert_eq!(created.id, OrderId::new("42"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Opaque identifier issued by the backend for a created order.
///
/// The backend may encode it as a JSON string or a JSON number. Both are
/// accepted and kept in their string form, which is also what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawOrderId", into = "String")]
pub struct OrderId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOrderId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawOrderId> for OrderId {
    fn from(raw: RawOrderId) -> Self {
        match raw {
            RawOrderId::Text(s) => Self(s),
            RawOrderId::Number(n) => Self(n.to_string()),
        }
    }
}

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payment channels the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "QRIS")]
    Qris,
    #[serde(rename = "OVO")]
    Ovo,
    #[serde(rename = "DANA")]
    Dana,
    #[serde(rename = "ShopeePay")]
    ShopeePay,
    #[serde(rename = "INDOMARET")]
    Indomaret,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Qris => "QRIS",
            PaymentMethod::Ovo => "OVO",
            PaymentMethod::Dana => "DANA",
            PaymentMethod::ShopeePay => "ShopeePay",
            PaymentMethod::Indomaret => "INDOMARET",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "QRIS" => Ok(PaymentMethod::Qris),
            "OVO" => Ok(PaymentMethod::Ovo),
            "DANA" => Ok(PaymentMethod::Dana),
            "SHOPEEPAY" => Ok(PaymentMethod::ShopeePay),
            "INDOMARET" => Ok(PaymentMethod::Indomaret),
            _ => Err(format!("unsupported payment method: {s}")),
        }
    }
}

/// Payload for `POST /topup`.
///
/// Values are forwarded exactly as the user typed them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopupRequest {
    pub phone: String,
    pub provider: String,
    pub nominal: String,
    pub method: PaymentMethod,
}

impl TopupRequest {
    /// Builds a request paid through the default channel (QRIS).
    pub fn new(
        phone: impl Into<String>,
        provider: impl Into<String>,
        nominal: impl Into<String>,
    ) -> Self {
        Self {
            phone: phone.into(),
            provider: provider.into(),
            nominal: nominal.into(),
            method: PaymentMethod::default(),
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }
}

/// Response of `POST /topup`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
    pub invoice_url: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreatedOrder {
    pub fn new(id: impl Into<OrderId>, invoice_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            invoice_url: invoice_url.into(),
            status: None,
            message: None,
        }
    }
}

/// Response of `GET /topup/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderStatus {
    pub status: String,
    #[serde(default)]
    pub invoice_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl OrderStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            invoice_url: None,
            message: None,
        }
    }

    pub fn with_invoice_url(mut self, url: impl Into<String>) -> Self {
        self.invoice_url = Some(url.into());
        self
    }

    /// `true` only when the label is exactly "paid", ignoring case.
    ///
    /// Composite labels such as `"PAID | WAITING_PAYMENT"` do not count.
    pub fn is_paid(&self) -> bool {
        self.status.eq_ignore_ascii_case("paid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_accepts_string_and_number() {
        let created: CreatedOrder =
            serde_json::from_str(r#"{"id":"A1","invoice_url":"http://pay/A1"}"#).unwrap();
        assert_eq!(created.id, OrderId::new("A1"));

        let created: CreatedOrder =
            serde_json::from_str(r#"{"id":42,"invoice_url":"http://pay/42"}"#).unwrap();
        assert_eq!(created.id.as_str(), "42");
    }

    #[test]
    fn test_order_id_serializes_as_string() {
        let json = serde_json::to_string(&OrderId::new("A1")).unwrap();
        assert_eq!(json, r#""A1""#);
    }

    #[test]
    fn test_topup_request_wire_shape() {
        let req = TopupRequest::new("0811", "X", "10000");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "phone": "0811",
                "provider": "X",
                "nominal": "10000",
                "method": "QRIS"
            })
        );
    }

    #[test]
    fn test_payment_method_parse_is_case_insensitive() {
        assert_eq!("qris".parse::<PaymentMethod>(), Ok(PaymentMethod::Qris));
        assert_eq!("shopeepay".parse::<PaymentMethod>(), Ok(PaymentMethod::ShopeePay));
        assert_eq!(PaymentMethod::ShopeePay.to_string(), "ShopeePay");
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_status_is_paid() {
        assert!(OrderStatus::new("paid").is_paid());
        assert!(OrderStatus::new("PAID").is_paid());
        assert!(!OrderStatus::new("pending").is_paid());
        assert!(!OrderStatus::new("PAID | WAITING_PAYMENT").is_paid());
        assert!(!OrderStatus::new(" paid").is_paid());
    }

    #[test]
    fn test_status_requires_status_field() {
        let missing = serde_json::from_str::<OrderStatus>(r#"{"invoice_url":"http://pay/A1"}"#);
        assert!(missing.is_err());

        let extra: OrderStatus =
            serde_json::from_str(r#"{"id":"A1","status":"UNPAID","message":"m","extra":1}"#)
                .unwrap();
        assert_eq!(extra.status, "UNPAID");
        assert_eq!(extra.invoice_url, None);
    }
}
