//! Application constants
//!
//! Centralized location for the domain-level constants shared by the engine
//! and its collaborators.

// Source schema field names
pub const FIELD_REQUEST_FROM_TIME: &str = "RequestFromTime";
pub const FIELD_REQUEST_TO_TIME: &str = "RequestToTime";
pub const FIELD_REQUEST_FROM_DATE: &str = "RequestFromDate";
pub const FIELD_REQUEST_TO_DATE: &str = "RequestToDate";
pub const FIELD_SERVICE_ORDER_ID: &str = "ServiceOrderId";
pub const FIELD_CUSTOM_ORDER_NUMBER: &str = "CustomOrderNumber";
pub const FIELD_ORDER_STATUS: &str = "OrderStatus";

/// Timestamp layout used by the work-order source for every date/time field.
pub const SOURCE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Timestamp layout written to the calendar target (six fractional digits).
pub const TARGET_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// Scheduling defaults
pub const DEFAULT_START_HOUR: u32 = 7;
pub const DEFAULT_END_HOUR: u32 = 17;
pub const NOON_HOUR: u32 = 12;
pub const AM_PM_CORRECTION_HOURS: i64 = 12;

// Sync defaults
pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_TIME_ZONE: &str = "America/Chicago";
pub const DEFAULT_ORDER_NUMBER_PREFIX: &str = "56561";
pub const DEFAULT_SERVICE_ORDER_URL: &str = "https://jgiquality.qualer.com/ServiceOrder/Info/";
pub const DEFAULT_WORK_ORDER_STATUS: &str = "OnSite";
pub const ORDER_NUMBER_DIGITS: usize = 6;

// Event payload constants
pub const BODY_CONTENT_TYPE_HTML: &str = "html";
pub const LOCATION_TYPE_DEFAULT: &str = "default";
