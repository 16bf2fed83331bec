//! Balance derived from the ledger and withdrawal history.

use marketplace_wallet_models::{Cents, EntryKind, Wallet, WalletBalance, WithdrawalStatus};

/// Computes what a provider has earned, withdrawn, reserved and can
/// still withdraw.
///
/// Approved and paid withdrawals count as withdrawn, pending ones as
/// reserved, and rejected ones are ignored. The available amount is
/// clamped at zero. Negative amounts are not valid ledger data and are
/// skipped.
#[must_use]
pub fn compute_balance(wallet: &Wallet) -> WalletBalance {
    let mut balance = WalletBalance::default();

    for entry in &wallet.entries {
        if entry.amount_cents.value() < 0 {
            log::warn!("Skipping ledger entry {} with negative amount", entry.id);
            continue;
        }
        match entry.kind {
            EntryKind::Credit => {
                balance.total_credits_cents =
                    balance.total_credits_cents.saturating_add(entry.amount_cents);
            }
            EntryKind::Debit => {
                balance.total_debits_cents =
                    balance.total_debits_cents.saturating_add(entry.amount_cents);
            }
        }
    }

    for withdrawal in &wallet.withdrawals {
        if withdrawal.amount_cents.value() < 0 {
            log::warn!("Skipping withdrawal {} with negative amount", withdrawal.id);
            continue;
        }
        match withdrawal.status {
            WithdrawalStatus::Approved | WithdrawalStatus::Paid => {
                balance.withdrawn_cents = balance.withdrawn_cents.saturating_add(withdrawal.amount_cents);
            }
            WithdrawalStatus::Pending => {
                balance.pending_cents = balance.pending_cents.saturating_add(withdrawal.amount_cents);
            }
            WithdrawalStatus::Rejected => {}
        }
    }

    balance.available_cents = balance
        .total_credits_cents
        .saturating_sub(balance.total_debits_cents)
        .saturating_sub(balance.withdrawn_cents)
        .saturating_sub(balance.pending_cents)
        .max(Cents::ZERO);

    balance
}
