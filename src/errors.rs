//! Unified error types for the gym ledger.
//!
//! Every core operation returns [`Result`]. Variants are grouped by [`ErrorKind`],
//! which the HTTP layer maps onto status codes.

use crate::money::Money;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: Money },

    #[error("Amount {requested} exceeds pending balance {pending}")]
    ExceedsPendingBalance { pending: Money, requested: Money },

    #[error("Payment {id} has been refunded and cannot accept new payments")]
    PaymentRefunded { id: i64 },

    #[error("Payment not found: {id}")]
    PaymentNotFound { id: i64 },

    #[error("Membership not found: {id}")]
    MembershipNotFound { id: i64 },

    #[error("Member not found: {id}")]
    MemberNotFound { id: i64 },

    #[error("Membership plan not found: {id}")]
    PlanNotFound { id: i64 },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Password hashing error: {message}")]
    PasswordHash { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the caller should fix the request.
    Validation,
    /// The referenced row does not exist.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// Store or infrastructure failure; safe to retry.
    StoreUnavailable,
}

impl Error {
    /// Classifies this error for the API layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::ExceedsPendingBalance { .. }
            | Self::PaymentRefunded { .. } => ErrorKind::Validation,
            Self::PaymentNotFound { .. }
            | Self::MembershipNotFound { .. }
            | Self::MemberNotFound { .. }
            | Self::PlanNotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Config { .. }
            | Self::PasswordHash { .. }
            | Self::Database(_)
            | Self::Io(_) => ErrorKind::StoreUnavailable,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::InvalidAmount {
                amount: Money::from_major(-1)
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::ExceedsPendingBalance {
                pending: Money::from_major(10),
                requested: Money::from_major(20)
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::PaymentNotFound { id: 1 }.kind(), ErrorKind::NotFound);
        assert_eq!(Error::conflict("taken").kind(), ErrorKind::Conflict);
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("down".to_string())).kind(),
            ErrorKind::StoreUnavailable
        );
    }

    #[test]
    fn test_balance_message_shows_plain_amounts() {
        let err = Error::ExceedsPendingBalance {
            pending: Money::from_minor(69_048),
            requested: Money::from_major(7000),
        };
        assert_eq!(err.to_string(), "Amount 7000 exceeds pending balance 690.48");
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = Error::validation("Password must be at least 8 characters long");
        assert_eq!(
            err.to_string(),
            "Password must be at least 8 characters long"
        );
    }
}
