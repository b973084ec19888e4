//! Canonical schema constants for structured logging
//!
//! `tracing` field names must be literal, so the macros spell keys out; these
//! constants are the names and values code reads back from recorded events.

// Field keys read back by the test capture
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_ORDER_UID: &str = "order_uid";

// Values of the `source` field on find_order end events
pub const SOURCE_CACHE: &str = "cache";
pub const SOURCE_STORE: &str = "store";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
