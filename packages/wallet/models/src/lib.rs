#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for service provider wallets.
//!
//! Amounts are whole centavos held in [`Cents`]; fractional reais never
//! appear in the ledger.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// An amount of Brazilian reais in centavos.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    /// Zero reais.
    pub const ZERO: Self = Self(0);

    /// The raw number of centavos.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Adds, clamping at the numeric bounds.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, clamping at the numeric bounds.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

/// Formats as `R$ 1.234,56`.
impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let reais = (abs / 100).to_string();
        let centavos = abs % 100;

        let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
        for (i, ch) in reais.chars().enumerate() {
            if i > 0 && (reais.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}R$ {grouped},{centavos:02}")
    }
}

/// Direction of a ledger entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntryKind {
    /// Money earned, e.g. a completed booking.
    Credit,
    /// Money taken, e.g. a platform fee or refund.
    Debit,
}

/// One movement in a provider's earnings ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Unique within the wallet.
    pub id: String,
    /// Whether the entry adds to or takes from the balance.
    pub kind: EntryKind,
    /// Always non-negative; [`LedgerEntry::kind`] gives the direction.
    pub amount_cents: Cents,
    /// Free text shown to the provider, e.g. the booked service.
    #[serde(default)]
    pub description: String,
    /// When the money moved.
    pub occurred_at: DateTime<Utc>,
}

/// Lifecycle of a withdrawal request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WithdrawalStatus {
    /// Requested, awaiting review. The amount is reserved.
    Pending,
    /// Approved for payout. The amount has left the balance.
    Approved,
    /// Paid out.
    Paid,
    /// Refused. The amount returns to the balance.
    Rejected,
}

/// A request to move earnings out of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    /// UUID assigned when the request is accepted.
    pub id: String,
    /// Always positive.
    pub amount_cents: Cents,
    /// The [`PaymentMethod::id`] receiving the payout.
    pub payment_method_id: String,
    /// Where the request stands in review.
    pub status: WithdrawalStatus,
    /// When the provider asked for the payout.
    pub requested_at: DateTime<Utc>,
}

/// Kinds of PIX keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PixKeyType {
    /// Individual taxpayer number, 11 digits.
    Cpf,
    /// Company taxpayer number, 14 digits.
    Cnpj,
    /// E-mail address.
    Email,
    /// Mobile number in `+55` form.
    Phone,
    /// Random key issued by the bank (a UUID).
    Random,
}

/// Where a payout is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// A Brazilian bank account.
    #[serde(rename_all = "camelCase")]
    BankAccount {
        /// Three-digit COMPE bank code, e.g. `"001"`.
        bank_code: String,
        /// Branch number, optionally with a check digit (`"1234-5"`).
        agency: String,
        /// Account number, optionally with a check digit (`"12345-X"`).
        account: String,
        /// Name of the account holder as registered at the bank.
        holder_name: String,
    },
    /// An instant payment key.
    #[serde(rename_all = "camelCase")]
    Pix {
        /// How the key is validated.
        key_type: PixKeyType,
        /// The key as entered by the provider.
        key: String,
    },
}

/// A payout destination registered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Referenced by [`WithdrawalRequest::payment_method_id`].
    pub id: String,
    /// Destination details, flattened into the same JSON object.
    #[serde(flatten)]
    pub kind: PaymentMethodKind,
}

/// A provider's ledger, withdrawals and payout destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Earnings ledger, in any order.
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
    /// Every withdrawal ever requested, whatever its status.
    #[serde(default)]
    pub withdrawals: Vec<Withdrawal>,
    /// Registered payout destinations.
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

impl Wallet {
    /// Looks up a registered payment method.
    #[must_use]
    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|m| m.id == id)
    }

    /// Number of withdrawals still awaiting review.
    #[must_use]
    pub fn pending_withdrawals(&self) -> usize {
        self.withdrawals
            .iter()
            .filter(|w| w.status == WithdrawalStatus::Pending)
            .count()
    }
}

/// Balance derived from a [`Wallet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    /// Sum of valid credit entries.
    pub total_credits_cents: Cents,
    /// Sum of valid debit entries.
    pub total_debits_cents: Cents,
    /// Approved and paid withdrawals.
    pub withdrawn_cents: Cents,
    /// Withdrawals awaiting review.
    pub pending_cents: Cents,
    /// What can still be withdrawn. Never negative.
    pub available_cents: Cents,
}

/// What a provider asks to withdraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    /// Amount to withdraw.
    pub amount_cents: Cents,
    /// Selected destination. Blank when none was chosen.
    #[serde(default)]
    pub payment_method_id: String,
}

/// Smallest withdrawal accepted by default: R$ 10,00.
pub const DEFAULT_MINIMUM_WITHDRAWAL: Cents = Cents(1_000);

/// Limits applied to withdrawal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WithdrawalPolicy {
    /// Smallest amount accepted.
    pub minimum_cents: Cents,
    /// Withdrawals allowed to await review at the same time.
    pub max_pending: usize,
}

impl Default for WithdrawalPolicy {
    fn default() -> Self {
        Self {
            minimum_cents: DEFAULT_MINIMUM_WITHDRAWAL,
            max_pending: 1,
        }
    }
}

/// An accepted withdrawal request, ready to be stored as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedWithdrawal {
    /// The new withdrawal, always [`WithdrawalStatus::Pending`].
    pub withdrawal: Withdrawal,
    /// The destination it will be paid to.
    pub payment_method: PaymentMethod,
    /// Balance once this withdrawal's amount is reserved.
    pub balance_after: WalletBalance,
}
