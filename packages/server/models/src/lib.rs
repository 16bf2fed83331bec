#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the service marketplace server.
//!
//! Response bodies reuse the domain types directly (`ParsedAddress`,
//! `PickedLocation`, `WalletBalance`, `ValidatedWithdrawal`); this crate
//! only holds what exists purely for the HTTP contract.

use marketplace_wallet_models::{Wallet, WithdrawalRequest};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable code, when the failure has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// An error without a code.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    /// An error with a stable code.
    #[must_use]
    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }
}

/// Where an address string came from, which selects the city denylist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressVariant {
    /// A search result the user selected.
    #[default]
    Search,
    /// A reverse-geocoded map click, drag or device position.
    MapClick,
}

/// Query parameters for `GET /api/address/decompose`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecomposeParams {
    /// The comma-separated address to decompose.
    pub raw: String,
    #[serde(default)]
    pub variant: AddressVariant,
}

/// Query parameters for `GET /api/location/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    /// Free-text query.
    pub q: String,
}

/// Query parameters for `GET /api/location/reverse`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
}

/// Body of `POST /api/wallet/withdrawals`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WithdrawalBody {
    pub wallet: Wallet,
    pub request: WithdrawalRequest,
}
