//! Validation of PIX keys and bank accounts.

use std::sync::LazyLock;

use marketplace_wallet_models::{PaymentMethod, PaymentMethodKind, PixKeyType};
use regex::Regex;

use crate::PaymentMethodError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+55\d{10,11}$").expect("valid regex"));

static BANK_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}$").expect("valid regex"));

static AGENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,5}(-\d)?$").expect("valid regex"));

static ACCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,12}(-[\dXx])?$").expect("valid regex"));

/// Checks that a payout destination is well formed.
///
/// # Errors
///
/// Returns the first [`PaymentMethodError`] found.
pub fn validate_payment_method(method: &PaymentMethod) -> Result<(), PaymentMethodError> {
    match &method.kind {
        PaymentMethodKind::Pix { key_type, key } => validate_pix_key(*key_type, key),
        PaymentMethodKind::BankAccount {
            bank_code,
            agency,
            account,
            holder_name,
        } => validate_bank_account(bank_code, agency, account, holder_name),
    }
}

/// Checks a PIX key against the format of its type.
///
/// # Errors
///
/// Returns the [`PaymentMethodError`] for the key type when the key is
/// malformed.
pub fn validate_pix_key(key_type: PixKeyType, key: &str) -> Result<(), PaymentMethodError> {
    let key = key.trim();
    match key_type {
        PixKeyType::Cpf => {
            let digits = document_digits(key).ok_or(PaymentMethodError::InvalidCpf)?;
            if is_valid_cpf(&digits) {
                Ok(())
            } else {
                Err(PaymentMethodError::InvalidCpf)
            }
        }
        PixKeyType::Cnpj => {
            let digits = document_digits(key).ok_or(PaymentMethodError::InvalidCnpj)?;
            if is_valid_cnpj(&digits) {
                Ok(())
            } else {
                Err(PaymentMethodError::InvalidCnpj)
            }
        }
        PixKeyType::Email => {
            if EMAIL_RE.is_match(key) {
                Ok(())
            } else {
                Err(PaymentMethodError::InvalidEmail {
                    key: key.to_string(),
                })
            }
        }
        PixKeyType::Phone => {
            let compact: String = key
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
                .collect();
            if PHONE_RE.is_match(&compact) {
                Ok(())
            } else {
                Err(PaymentMethodError::InvalidPhone)
            }
        }
        PixKeyType::Random => {
            if key.len() == 36 && uuid::Uuid::parse_str(key).is_ok() {
                Ok(())
            } else {
                Err(PaymentMethodError::InvalidRandomKey)
            }
        }
    }
}

fn validate_bank_account(
    bank_code: &str,
    agency: &str,
    account: &str,
    holder_name: &str,
) -> Result<(), PaymentMethodError> {
    if !BANK_CODE_RE.is_match(bank_code.trim()) {
        return Err(PaymentMethodError::InvalidBankCode {
            bank_code: bank_code.to_string(),
        });
    }
    if !AGENCY_RE.is_match(agency.trim()) {
        return Err(PaymentMethodError::InvalidAgency {
            agency: agency.to_string(),
        });
    }
    if !ACCOUNT_RE.is_match(account.trim()) {
        return Err(PaymentMethodError::InvalidAccount {
            account: account.to_string(),
        });
    }
    if holder_name.trim().is_empty() {
        return Err(PaymentMethodError::MissingHolderName);
    }
    Ok(())
}

/// Strips CPF/CNPJ punctuation (`.`, `-`, `/`) and returns the digits, or
/// `None` if anything else is present.
fn document_digits(key: &str) -> Option<Vec<u32>> {
    key.chars()
        .filter(|c| !matches!(c, '.' | '-' | '/'))
        .map(|c| c.to_digit(10))
        .collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn is_valid_cpf(digits: &[u32]) -> bool {
    const WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

    if digits.len() != 11 || all_same(digits) {
        return false;
    }

    let check = |len: usize| {
        let weights = &WEIGHTS[WEIGHTS.len() - len..];
        let sum: u32 = digits[..len].iter().zip(weights).map(|(d, w)| d * w).sum();
        (sum * 10) % 11 % 10
    };

    check(9) == digits[9] && check(10) == digits[10]
}

fn is_valid_cnpj(digits: &[u32]) -> bool {
    const WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    if digits.len() != 14 || all_same(digits) {
        return false;
    }

    let check = |len: usize| {
        let weights = &WEIGHTS[WEIGHTS.len() - len..];
        let sum: u32 = digits[..len].iter().zip(weights).map(|(d, w)| d * w).sum();
        match sum % 11 {
            0 | 1 => 0,
            r => 11 - r,
        }
    };

    check(12) == digits[12] && check(13) == digits[13]
}
