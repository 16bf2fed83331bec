#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Provider wallet logic: balance computation, payout destination checks
//! and withdrawal request validation.
//!
//! Wallet data is supplied by the caller; nothing here persists state.

pub mod balance;
pub mod payment_method;
pub mod withdrawal;

pub use balance::compute_balance;
pub use payment_method::validate_payment_method;
pub use withdrawal::validate_withdrawal;

use marketplace_wallet_models::Cents;
use thiserror::Error;

/// A payout destination that cannot receive money.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentMethodError {
    /// The CPF key is malformed or fails its check digits.
    #[error("CPF key must have 11 digits and valid check digits")]
    InvalidCpf,

    /// The CNPJ key is malformed or fails its check digits.
    #[error("CNPJ key must have 14 digits and valid check digits")]
    InvalidCnpj,

    /// The e-mail key is not a plausible address.
    #[error("Invalid e-mail key: {key:?}")]
    InvalidEmail { key: String },

    /// The phone key is not a Brazilian `+55` number.
    #[error("Phone key must be +55 followed by 10 or 11 digits")]
    InvalidPhone,

    /// The random key is not a UUID.
    #[error("Random key must be a UUID")]
    InvalidRandomKey,

    /// The bank code is not three digits.
    #[error("Bank code must have 3 digits, got {bank_code:?}")]
    InvalidBankCode { bank_code: String },

    /// The agency number is malformed.
    #[error("Invalid agency {agency:?}")]
    InvalidAgency { agency: String },

    /// The account number is malformed.
    #[error("Invalid account number {account:?}")]
    InvalidAccount { account: String },

    /// The bank account has no holder name.
    #[error("Account holder name is required")]
    MissingHolderName,
}

impl PaymentMethodError {
    /// Stable identifier for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCpf => "invalid_cpf",
            Self::InvalidCnpj => "invalid_cnpj",
            Self::InvalidEmail { .. } => "invalid_email",
            Self::InvalidPhone => "invalid_phone",
            Self::InvalidRandomKey => "invalid_random_key",
            Self::InvalidBankCode { .. } => "invalid_bank_code",
            Self::InvalidAgency { .. } => "invalid_agency",
            Self::InvalidAccount { .. } => "invalid_account",
            Self::MissingHolderName => "missing_holder_name",
        }
    }
}

/// Why a withdrawal request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WithdrawalError {
    /// Zero or negative amount.
    #[error("Withdrawal amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Cents },

    /// Positive amount under [`WithdrawalPolicy::minimum_cents`](marketplace_wallet_models::WithdrawalPolicy::minimum_cents).
    #[error("Minimum withdrawal is {minimum}, requested {amount}")]
    BelowMinimum { amount: Cents, minimum: Cents },

    /// Blank payment method id.
    #[error("Select a payment method")]
    NoPaymentMethodSelected,

    /// No payment method in the wallet has this id.
    #[error("Payment method {id:?} not found")]
    UnknownPaymentMethod { id: String },

    /// The selected payment method failed validation.
    #[error("Payment method {id:?} is invalid: {source}")]
    InvalidPaymentMethod {
        id: String,
        #[source]
        source: PaymentMethodError,
    },

    /// The wallet already holds the allowed number of pending withdrawals.
    #[error("{pending} withdrawal(s) already awaiting review (limit {max})")]
    TooManyPending { pending: usize, max: usize },

    /// The amount exceeds the available balance.
    #[error("Requested {requested} exceeds available balance {available}")]
    InsufficientBalance { requested: Cents, available: Cents },
}

impl WithdrawalError {
    /// Stable identifier for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount { .. } => "non_positive_amount",
            Self::BelowMinimum { .. } => "below_minimum",
            Self::NoPaymentMethodSelected => "no_payment_method",
            Self::UnknownPaymentMethod { .. } => "unknown_payment_method",
            Self::InvalidPaymentMethod { .. } => "invalid_payment_method",
            Self::TooManyPending { .. } => "too_many_pending",
            Self::InsufficientBalance { .. } => "insufficient_balance",
        }
    }
}
