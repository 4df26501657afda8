// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment fallbacks for provider attributes.

use tracing::trace;
use xcseal_common_secret::SecretString;

pub const ENV_P12_FILE: &str = "VOLT_API_P12_FILE";
pub const ENV_P12_PASSWORD: &str = "VES_P12_PASSWORD";
pub const ENV_CERT: &str = "VOLT_API_CERT";
pub const ENV_KEY: &str = "VOLT_API_KEY";
pub const ENV_TOKEN: &str = "VOLTERRA_TOKEN";
pub const ENV_TIMEOUT: &str = "VOLT_API_TIMEOUT";
pub const ENV_URL: &str = "VOLT_API_URL";

/// Values read from the process environment. Empty variables count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvLayer {
	pub p12_file: Option<String>,
	pub p12_password: Option<SecretString>,
	pub cert: Option<String>,
	pub key: Option<String>,
	pub token: Option<SecretString>,
	pub timeout: Option<String>,
	pub url: Option<String>,
}

impl EnvLayer {
	pub fn from_env() -> Self {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Build the layer from an arbitrary lookup, so callers and tests never
	/// have to mutate the real process environment.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| {
			let value = lookup(name).filter(|v| !v.is_empty());
			trace!(var = name, set = value.is_some(), "read environment fallback");
			value
		};

		Self {
			p12_file: var(ENV_P12_FILE),
			p12_password: var(ENV_P12_PASSWORD).map(SecretString::new),
			cert: var(ENV_CERT),
			key: var(ENV_KEY),
			token: var(ENV_TOKEN).map(SecretString::new),
			timeout: var(ENV_TIMEOUT),
			url: var(ENV_URL),
		}
	}
}
