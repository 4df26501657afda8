// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Merge declared provider attributes over the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};
use xcseal_common_secret::SecretString;

use crate::declared::{Declared, ProviderConfigLayer};
use crate::env::{
	EnvLayer, ENV_CERT, ENV_KEY, ENV_P12_FILE, ENV_TIMEOUT, ENV_TOKEN, ENV_URL,
};
use crate::error::{ConfigError, ConfigErrors};

/// Request timeout used when neither the declaration nor the environment
/// supplies one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// PKCS#12 bundle and the passphrase that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkcs12Identity {
	pub path: PathBuf,
	pub passphrase: SecretString,
}

/// PEM certificate and private key files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemIdentity {
	pub cert: PathBuf,
	pub key: PathBuf,
}

/// Authentication material enabled for the API client.
///
/// Each entry is gated on presence only. Several may be enabled at once; the
/// HTTP client decides how they combine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthMaterial {
	pub token: Option<SecretString>,
	pub pkcs12: Option<Pkcs12Identity>,
	pub pem: Option<PemIdentity>,
}

impl AuthMaterial {
	fn select(
		token: Option<SecretString>,
		p12_file: Option<String>,
		p12_password: Option<SecretString>,
		cert: Option<String>,
		key: Option<String>,
	) -> Self {
		let token = token.filter(|t| !t.is_empty());
		let pkcs12 = match (non_empty(p12_file), p12_password.filter(|p| !p.is_empty())) {
			(Some(path), Some(passphrase)) => Some(Pkcs12Identity {
				path: PathBuf::from(path),
				passphrase,
			}),
			_ => None,
		};
		let pem = match (non_empty(cert), non_empty(key)) {
			(Some(cert), Some(key)) => Some(PemIdentity {
				cert: PathBuf::from(cert),
				key: PathBuf::from(key),
			}),
			_ => None,
		};
		Self { token, pkcs12, pem }
	}

	/// Names of the enabled methods, for logging.
	pub fn methods(&self) -> Vec<&'static str> {
		let mut methods = Vec::new();
		if self.token.is_some() {
			methods.push("token");
		}
		if self.pkcs12.is_some() {
			methods.push("pkcs12");
		}
		if self.pem.is_some() {
			methods.push("cert_key_pair");
		}
		methods
	}

	pub fn is_anonymous(&self) -> bool {
		self.token.is_none() && self.pkcs12.is_none() && self.pem.is_none()
	}
}

/// Fully resolved provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
	pub url: String,
	pub timeout: Duration,
	pub auth: AuthMaterial,
}

/// Resolve the provider configuration.
///
/// Unknown declared values are all reported together and stop resolution.
/// Otherwise a declared value (even an empty one) wins over its environment
/// variable, and the URL and timeout checks are reported together.
pub fn resolve(declared: &ProviderConfigLayer, env: &EnvLayer) -> Result<ResolvedConfig, ConfigErrors> {
	let unknown: Vec<ConfigError> = [
		("api_p12_file", ENV_P12_FILE, declared.api_p12_file.is_unknown()),
		("api_cert", ENV_CERT, declared.api_cert.is_unknown()),
		("api_key", ENV_KEY, declared.api_key.is_unknown()),
		("api_token", ENV_TOKEN, declared.api_token.is_unknown()),
		("timeout", ENV_TIMEOUT, declared.timeout.is_unknown()),
		("url", ENV_URL, declared.url.is_unknown()),
	]
	.into_iter()
	.filter(|(_, _, unknown)| *unknown)
	.map(|(field, env_var, _)| ConfigError::Unknown { field, env_var })
	.collect();
	if !unknown.is_empty() {
		return Err(ConfigErrors::new(unknown));
	}

	let p12_file = or_env(&declared.api_p12_file, &env.p12_file);
	let cert = or_env(&declared.api_cert, &env.cert);
	let key = or_env(&declared.api_key, &env.key);
	let token = or_env(&declared.api_token, &env.token);
	let timeout = or_env(&declared.timeout, &env.timeout);
	let url = or_env(&declared.url, &env.url);

	let mut errors = Vec::new();
	let timeout = parse_timeout(timeout.as_deref()).unwrap_or_else(|e| {
		errors.push(e);
		DEFAULT_TIMEOUT
	});
	let url = validate_url(url).unwrap_or_else(|e| {
		errors.push(e);
		String::new()
	});
	if !errors.is_empty() {
		return Err(ConfigErrors::new(errors));
	}

	let auth = AuthMaterial::select(token, p12_file, env.p12_password.clone(), cert, key);
	if auth.is_anonymous() {
		debug!("no authentication material configured; requests will be anonymous");
	}
	info!(
		url = %url,
		timeout = %humantime::format_duration(timeout),
		auth = ?auth.methods(),
		"resolved provider configuration"
	);

	Ok(ResolvedConfig { url, timeout, auth })
}

// Unknown values were rejected before this is called.
fn or_env<T: Clone>(declared: &Declared<T>, env: &Option<T>) -> Option<T> {
	match declared {
		Declared::Value(v) => Some(v.clone()),
		Declared::Null | Declared::Unknown => env.clone(),
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.is_empty())
}

/// Parse a timeout string. Only an absent or empty value gets the default.
pub fn parse_timeout(value: Option<&str>) -> Result<Duration, ConfigError> {
	let value = match value.map(str::trim) {
		None | Some("") => return Ok(DEFAULT_TIMEOUT),
		Some(v) => v,
	};
	let timeout = humantime::parse_duration(value).map_err(|e| ConfigError::InvalidValue {
		field: "timeout",
		cause: format!("unable to parse '{value}' as a duration: {e}"),
	})?;
	if timeout.is_zero() {
		return Err(ConfigError::InvalidValue {
			field: "timeout",
			cause: "timeout must be greater than zero".to_string(),
		});
	}
	Ok(timeout)
}

fn validate_url(url: Option<String>) -> Result<String, ConfigError> {
	let url = url.map(|u| u.trim().to_string()).unwrap_or_default();
	if url.is_empty() {
		return Err(ConfigError::Missing {
			field: "url",
			env_var: ENV_URL,
		});
	}
	if !url.starts_with("https://") && !url.starts_with("http://") {
		return Err(ConfigError::InvalidValue {
			field: "url",
			cause: format!("'{url}' must start with https:// or http://"),
		});
	}
	Ok(url)
}
