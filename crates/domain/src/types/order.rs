//! Work orders as delivered by the work-order source.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    FIELD_CUSTOM_ORDER_NUMBER, FIELD_ORDER_STATUS, FIELD_REQUEST_FROM_DATE,
    FIELD_REQUEST_FROM_TIME, FIELD_REQUEST_TO_DATE, FIELD_REQUEST_TO_TIME,
    FIELD_SERVICE_ORDER_ID, SOURCE_DATETIME_FORMAT,
};
use crate::{CalSyncError, Result};

/// Lifecycle status of a work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Scheduling,
    Processing,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

/// Shipping address block of a work order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShippingAddress {
    pub address1: Option<String>,
    pub city: Option<String>,
    pub state_province_abbreviation: Option<String>,
    pub zip_postal_code: Option<String>,
}

impl ShippingAddress {
    /// Render `"<Address1>, <City>, <State> <Zip>"`.
    pub fn display_line(&self) -> String {
        let part = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();
        format!(
            "{}, {}, {} {}",
            part(&self.address1),
            part(&self.city),
            part(&self.state_province_abbreviation),
            part(&self.zip_postal_code)
        )
    }
}

/// Raw work order payload. Immutable within a run.
///
/// Every field is optional at the wire level so that one malformed record
/// fails only its own order instead of the whole window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WorkOrder {
    #[serde(deserialize_with = "lenient_id")]
    pub service_order_id: Option<String>,
    pub custom_order_number: Option<String>,
    pub order_status: Option<OrderStatus>,
    #[serde(deserialize_with = "blank_as_none")]
    pub request_from_date: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub request_to_date: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub request_from_time: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub request_to_time: Option<String>,
    pub client_company_name: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
}

/// Technician assignment on a work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Assignment {
    #[serde(deserialize_with = "required_id")]
    pub employee_id: String,
}

/// Identity fields every processable order must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIdentity {
    pub service_order_id: String,
    pub custom_order_number: String,
    pub status: OrderStatus,
}

impl WorkOrder {
    /// Extract the identity triple, naming every missing field on failure.
    pub fn identity(&self) -> Result<OrderIdentity> {
        let mut missing = Vec::new();
        if self.service_order_id.is_none() {
            missing.push(FIELD_SERVICE_ORDER_ID);
        }
        if self.custom_order_number.is_none() {
            missing.push(FIELD_CUSTOM_ORDER_NUMBER);
        }
        if self.order_status.is_none() {
            missing.push(FIELD_ORDER_STATUS);
        }

        match (&self.service_order_id, &self.custom_order_number, &self.order_status) {
            (Some(id), Some(number), Some(status)) => Ok(OrderIdentity {
                service_order_id: id.clone(),
                custom_order_number: number.clone(),
                status: status.clone(),
            }),
            _ => Err(CalSyncError::missing_fields(missing)),
        }
    }

    /// Best label for logs and run summaries, even for malformed orders.
    pub fn label(&self) -> String {
        self.custom_order_number
            .clone()
            .or_else(|| self.service_order_id.clone())
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        self.order_status == Some(OrderStatus::Cancelled)
    }

    pub fn address_line(&self) -> String {
        self.shipping_address.clone().unwrap_or_default().display_line()
    }

    pub fn request_from_date(&self) -> Result<Option<NaiveDateTime>> {
        parse_field(FIELD_REQUEST_FROM_DATE, self.request_from_date.as_deref())
    }

    pub fn request_to_date(&self) -> Result<Option<NaiveDateTime>> {
        parse_field(FIELD_REQUEST_TO_DATE, self.request_to_date.as_deref())
    }

    pub fn request_from_time(&self) -> Result<Option<NaiveDateTime>> {
        parse_field(FIELD_REQUEST_FROM_TIME, self.request_from_time.as_deref())
    }

    pub fn request_to_time(&self) -> Result<Option<NaiveDateTime>> {
        parse_field(FIELD_REQUEST_TO_TIME, self.request_to_time.as_deref())
    }
}

/// Parse one of the source's ISO-like timestamp fields.
pub fn parse_source_datetime(value: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), SOURCE_DATETIME_FORMAT)
}

fn parse_field(field: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>> {
    value
        .map(|raw| {
            parse_source_datetime(raw).map_err(|e| {
                CalSyncError::InvalidInput(format!("{field} has unparseable value {raw:?}: {e}"))
            })
        })
        .transpose()
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// The source emits ids as either JSON numbers or strings.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn required_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_id(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing identifier"))
}
