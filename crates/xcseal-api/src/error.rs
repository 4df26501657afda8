// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the secret management client.

use thiserror::Error;

/// Errors from building the client or calling the API.
///
/// "Not found" is not an error here: lookups return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum ApiError {
	/// The resolved configuration could not be turned into a client.
	#[error("invalid client configuration for {field}: {cause}")]
	Configuration { field: &'static str, cause: String },

	/// Connection, TLS or protocol failure.
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),

	/// Non-success status other than 404.
	#[error("server returned HTTP {status}: {body}")]
	Status { status: u16, body: String },

	/// The body was not the JSON we expected.
	#[error("invalid response: {0}")]
	InvalidResponse(String),
}

/// Result type for secret management client operations.
pub type ApiResult<T> = Result<T, ApiError>;
