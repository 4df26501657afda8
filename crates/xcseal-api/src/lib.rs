// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client for the F5 Distributed Cloud secret management API.
//!
//! Sealing needs two documents from the tenant: the current public key and a
//! named secret policy document. [`SecretManagementApi`] exposes both reads;
//! each returns `Ok(None)` when the document does not exist so callers can
//! tell "absent" apart from a failed call.
//!
//! ```ignore
//! let client = HttpApiClient::new(&resolved)?;
//! let key = client.get_public_key().await?;
//! let policy = client
//!     .get_secret_policy_document(&PolicyRef::new("ves-io-allow-volterra", "shared"))
//!     .await?;
//! ```

mod client;
mod error;
mod mock;
mod types;

pub use client::{user_agent, HttpApiClient, SecretManagementApi};
pub use error::{ApiError, ApiResult};
pub use mock::{sample_policy_document, sample_public_key, ApiCall, MockSecretManagementApi};
pub use types::{PolicyRef, PublicKey, SecretPolicyDocument};
