//! Withdrawal request validation.

use chrono::Utc;
use marketplace_wallet_models::{
    ValidatedWithdrawal, Wallet, Withdrawal, WithdrawalPolicy, WithdrawalRequest,
    WithdrawalStatus,
};

use crate::{WithdrawalError, compute_balance, validate_payment_method};

/// Validates a withdrawal request against a wallet.
///
/// Checks run in a fixed order and the first failure is returned: the
/// amount is positive, meets the policy minimum, a payment method is
/// selected, exists and is valid, the pending limit is not reached, and
/// the amount fits the available balance.
///
/// On success the withdrawal is returned as [`WithdrawalStatus::Pending`]
/// with a fresh id, together with the balance once its amount is
/// reserved. The wallet itself is not modified.
///
/// # Errors
///
/// Returns the first [`WithdrawalError`] that applies.
pub fn validate_withdrawal(
    wallet: &Wallet,
    request: &WithdrawalRequest,
    policy: &WithdrawalPolicy,
) -> Result<ValidatedWithdrawal, WithdrawalError> {
    let amount = request.amount_cents;

    if !amount.is_positive() {
        return Err(WithdrawalError::NonPositiveAmount { amount });
    }
    if amount < policy.minimum_cents {
        return Err(WithdrawalError::BelowMinimum {
            amount,
            minimum: policy.minimum_cents,
        });
    }

    let method_id = request.payment_method_id.trim();
    if method_id.is_empty() {
        return Err(WithdrawalError::NoPaymentMethodSelected);
    }

    let method = wallet
        .payment_method(method_id)
        .ok_or_else(|| WithdrawalError::UnknownPaymentMethod {
            id: method_id.to_string(),
        })?;

    validate_payment_method(method).map_err(|source| WithdrawalError::InvalidPaymentMethod {
        id: method.id.clone(),
        source,
    })?;

    let pending = wallet.pending_withdrawals();
    if pending >= policy.max_pending {
        return Err(WithdrawalError::TooManyPending {
            pending,
            max: policy.max_pending,
        });
    }

    let mut balance = compute_balance(wallet);
    if amount > balance.available_cents {
        return Err(WithdrawalError::InsufficientBalance {
            requested: amount,
            available: balance.available_cents,
        });
    }

    balance.pending_cents = balance.pending_cents.saturating_add(amount);
    balance.available_cents = balance.available_cents.saturating_sub(amount);

    let withdrawal = Withdrawal {
        id: uuid::Uuid::new_v4().to_string(),
        amount_cents: amount,
        payment_method_id: method.id.clone(),
        status: WithdrawalStatus::Pending,
        requested_at: Utc::now(),
    };

    log::info!(
        "Accepted withdrawal {} of {amount} to {}",
        withdrawal.id,
        method.id
    );

    Ok(ValidatedWithdrawal {
        withdrawal,
        payment_method: method.clone(),
        balance_after: balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaymentMethodError;
    use crate::balance::tests::{entry, withdrawal};
    use marketplace_wallet_models::{Cents, EntryKind, PaymentMethod, PaymentMethodKind, PixKeyType};

    fn pix(id: &str, key_type: PixKeyType, key: &str) -> PaymentMethod {
        PaymentMethod {
            id: id.to_string(),
            kind: PaymentMethodKind::Pix {
                key_type,
                key: key.to_string(),
            },
        }
    }

    /// R$ 150,00 earned, R$ 20,00 paid out: R$ 130,00 available.
    fn wallet() -> Wallet {
        Wallet {
            entries: vec![entry("e1", EntryKind::Credit, 15_000)],
            withdrawals: vec![withdrawal("w0", 2_000, WithdrawalStatus::Paid)],
            payment_methods: vec![
                pix("pix-email", PixKeyType::Email, "ana@example.com"),
                pix("pix-bad", PixKeyType::Cpf, "123.456.789-00"),
            ],
        }
    }

    fn request(cents: i64, method: &str) -> WithdrawalRequest {
        WithdrawalRequest {
            amount_cents: Cents(cents),
            payment_method_id: method.to_string(),
        }
    }

    fn validate(request: &WithdrawalRequest) -> Result<ValidatedWithdrawal, WithdrawalError> {
        validate_withdrawal(&wallet(), request, &WithdrawalPolicy::default())
    }

    #[test]
    fn accepts_valid_request() {
        let validated = validate(&request(5_000, "pix-email")).unwrap();

        assert_eq!(validated.withdrawal.amount_cents, Cents(5_000));
        assert_eq!(validated.withdrawal.status, WithdrawalStatus::Pending);
        assert_eq!(validated.withdrawal.payment_method_id, "pix-email");
        assert!(uuid::Uuid::parse_str(&validated.withdrawal.id).is_ok());
        assert_eq!(validated.payment_method.id, "pix-email");
        assert_eq!(validated.balance_after.pending_cents, Cents(5_000));
        assert_eq!(validated.balance_after.available_cents, Cents(8_000));
    }

    #[test]
    fn whole_available_balance_can_be_withdrawn() {
        let validated = validate(&request(13_000, "pix-email")).unwrap();
        assert_eq!(validated.balance_after.available_cents, Cents::ZERO);
    }

    #[test]
    fn method_id_is_trimmed() {
        assert!(validate(&request(5_000, "  pix-email ")).is_ok());
    }

    #[test]
    fn rejects_non_positive_amount() {
        assert_eq!(
            validate(&request(0, "pix-email")),
            Err(WithdrawalError::NonPositiveAmount { amount: Cents(0) })
        );
        assert_eq!(
            validate(&request(-500, "pix-email")).unwrap_err().code(),
            "non_positive_amount"
        );
    }

    #[test]
    fn rejects_below_minimum() {
        assert_eq!(
            validate(&request(999, "pix-email")),
            Err(WithdrawalError::BelowMinimum {
                amount: Cents(999),
                minimum: Cents(1_000)
            })
        );
    }

    #[test]
    fn requires_a_selected_method() {
        assert_eq!(
            validate(&request(5_000, "  ")),
            Err(WithdrawalError::NoPaymentMethodSelected)
        );
    }

    #[test]
    fn rejects_unknown_method() {
        assert_eq!(
            validate(&request(5_000, "pix-gone")),
            Err(WithdrawalError::UnknownPaymentMethod {
                id: "pix-gone".to_string()
            })
        );
    }

    #[test]
    fn rejects_invalid_pix_key() {
        assert_eq!(
            validate(&request(5_000, "pix-bad")),
            Err(WithdrawalError::InvalidPaymentMethod {
                id: "pix-bad".to_string(),
                source: PaymentMethodError::InvalidCpf
            })
        );
    }

    #[test]
    fn rejects_when_pending_limit_reached() {
        let mut wallet = wallet();
        wallet
            .withdrawals
            .push(withdrawal("w1", 1_000, WithdrawalStatus::Pending));

        let result = validate_withdrawal(
            &wallet,
            &request(5_000, "pix-email"),
            &WithdrawalPolicy::default(),
        );
        assert_eq!(
            result,
            Err(WithdrawalError::TooManyPending { pending: 1, max: 1 })
        );

        let relaxed = WithdrawalPolicy {
            max_pending: 2,
            ..WithdrawalPolicy::default()
        };
        let validated = validate_withdrawal(&wallet, &request(5_000, "pix-email"), &relaxed).unwrap();
        assert_eq!(validated.balance_after.pending_cents, Cents(6_000));
    }

    #[test]
    fn rejects_amount_above_available() {
        let err = validate(&request(13_001, "pix-email")).unwrap_err();
        assert_eq!(
            err,
            WithdrawalError::InsufficientBalance {
                requested: Cents(13_001),
                available: Cents(13_000)
            }
        );
        assert_eq!(
            err.to_string(),
            "Requested R$ 130,01 exceeds available balance R$ 130,00"
        );
    }

    #[test]
    fn amount_checks_run_before_method_checks() {
        assert_eq!(
            validate(&request(500, "pix-gone")).unwrap_err().code(),
            "below_minimum"
        );
    }
}
