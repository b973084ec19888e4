//! Error facility
//!
//! `ExError` is the one error type crossing crate boundaries: a kind with a
//! stable code for callers deciding on retries and responses, plus the
//! operation, order and request it happened in. Domain rule violations are
//! the `OrderError` enum and convert into `ExError`.

use ordervault_core_types::{Interrupt, RequestId};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExError>;

/// What went wrong, coarse enough to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    /// Caller supplied something unusable (empty uid, invalid totals)
    InvalidInput,
    /// Database failure; the transaction, if any, was rolled back
    Persistence,
    /// Applied migration differs from the embedded SQL
    ChecksumMismatch,
    Serialization,
    Io,
    Cancelled,
    DeadlineExceeded,
    /// Unusable settings at startup
    Configuration,
}

impl ExErrorKind {
    /// Stable code, safe to match on
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "ERR_INVALID_INPUT",
            Self::Persistence => "ERR_PERSISTENCE",
            Self::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            Self::Serialization => "ERR_SERIALIZATION",
            Self::Io => "ERR_IO",
            Self::Cancelled => "ERR_CANCELLED",
            Self::DeadlineExceeded => "ERR_DEADLINE_EXCEEDED",
            Self::Configuration => "ERR_CONFIGURATION",
        }
    }
}

impl From<Interrupt> for ExErrorKind {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Cancelled => Self::Cancelled,
            Interrupt::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

/// Structured error carried through store, repository and CLI
///
/// Built with the `with_*` methods:
///
/// ```
/// use ordervault_core::errors::{ExError, ExErrorKind};
///
/// let err = ExError::new(ExErrorKind::Persistence)
///     .with_op("write_order")
///     .with_order_uid("b563feb7b2b84b6test")
///     .with_message("database is locked");
/// assert_eq!(err.code(), "ERR_PERSISTENCE");
/// ```
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    order_uid: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            order_uid: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Error for an operation stopped by its `OpContext`
    pub fn interrupted(interrupt: Interrupt, op: &str) -> Self {
        let message = match interrupt {
            Interrupt::Cancelled => "operation cancelled",
            Interrupt::DeadlineExceeded => "operation deadline exceeded",
        };
        Self::new(interrupt.into()).with_op(op).with_message(message)
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_order_uid(mut self, order_uid: impl Into<String>) -> Self {
        self.order_uid = Some(order_uid.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn order_uid(&self) -> Option<&str> {
        self.order_uid.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for cancellation and deadline expiry
    ///
    /// Shutdown paths use this to avoid reporting an aborted call as a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self.kind,
            ExErrorKind::Cancelled | ExErrorKind::DeadlineExceeded
        )
    }
}

/// `[CODE] op: message (order_uid: ...)`, omitting absent parts
impl fmt::Display for ExError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code())?;
        match (&self.op, self.message.is_empty()) {
            (Some(op), false) => write!(f, " {}: {}", op, self.message)?,
            (Some(op), true) => write!(f, " {}", op)?,
            (None, false) => write!(f, " {}", self.message)?,
            (None, true) => {}
        }
        if let Some(order_uid) = &self.order_uid {
            write!(f, " (order_uid: {})", order_uid)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

/// Domain validation errors for order aggregates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    /// Order identifier is empty or whitespace-only
    #[error("Order uid must not be empty")]
    EmptyOrderUid,

    /// Item discount outside 0..=100
    #[error("Item {index} of order {order_uid} has sale {sale}, expected 0..=100")]
    SaleOutOfRange {
        order_uid: String,
        index: usize,
        sale: i32,
    },

    /// Item price below zero
    #[error("Item {index} of order {order_uid} has negative price {price}")]
    NegativePrice {
        order_uid: String,
        index: usize,
        price: i64,
    },

    /// goods_total does not equal the sum of item totals
    #[error("Order {order_uid}: goods_total {goods_total} != sum of item totals {items_total}")]
    GoodsTotalMismatch {
        order_uid: String,
        goods_total: f64,
        items_total: f64,
    },

    /// amount does not equal delivery_cost + goods_total + custom_fee
    #[error("Order {order_uid}: amount {amount} != delivery_cost + goods_total + custom_fee ({expected})")]
    AmountMismatch {
        order_uid: String,
        amount: f64,
        expected: f64,
    },

    /// Serialization error (JSON decoding of an incoming event)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<OrderError> for ExError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyOrderUid => ExError::new(ExErrorKind::InvalidInput)
                .with_op("validate_order")
                .with_message("Order uid must not be empty"),

            OrderError::SaleOutOfRange { ref order_uid, .. }
            | OrderError::NegativePrice { ref order_uid, .. }
            | OrderError::GoodsTotalMismatch { ref order_uid, .. }
            | OrderError::AmountMismatch { ref order_uid, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("validate_order")
                    .with_order_uid(order_uid.clone())
                    .with_message(err.to_string())
            }

            OrderError::Serialization { message } => ExError::new(ExErrorKind::Serialization)
                .with_op("decode_order")
                .with_message(message),
        }
    }
}

impl From<serde_json::Error> for OrderError {
    fn from(err: serde_json::Error) -> Self {
        OrderError::Serialization {
            message: err.to_string(),
        }
    }
}
