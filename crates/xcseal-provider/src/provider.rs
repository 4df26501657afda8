// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};
use xcseal_api::{ApiError, HttpApiClient, SecretManagementApi};
use xcseal_blindfold::{Sealer, VesctlSealer};
use xcseal_config::{resolve, EnvLayer, ProviderConfigLayer};

use crate::error::{Diagnostics, LifecycleError};

/// Shared by every resource; never mutated after construction.
#[derive(Clone)]
pub struct ClientConfig {
	pub api: Arc<dyn SecretManagementApi>,
	pub sealer: Arc<dyn Sealer>,
	/// Applied to each outbound call separately.
	pub timeout: Duration,
}

impl ClientConfig {
	pub fn new(
		api: Arc<dyn SecretManagementApi>,
		sealer: Arc<dyn Sealer>,
		timeout: Duration,
	) -> Self {
		Self {
			api,
			sealer,
			timeout,
		}
	}
}

impl fmt::Debug for ClientConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientConfig")
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

/// Resolve provider configuration and build the HTTP client and vesctl sealer.
#[instrument(skip_all)]
pub fn configure(
	declared: &ProviderConfigLayer,
	env: &EnvLayer,
) -> Result<Arc<ClientConfig>, Diagnostics> {
	let resolved = resolve(declared, env)?;

	let api = HttpApiClient::new(&resolved).map_err(|e| match e {
		ApiError::Configuration { field, cause } => LifecycleError::Configuration {
			field: field.to_string(),
			cause,
		},
		other => LifecycleError::Configuration {
			field: "provider".to_string(),
			cause: other.to_string(),
		},
	})?;

	info!(
		url = %resolved.url,
		timeout = %humantime::format_duration(resolved.timeout),
		auth = ?resolved.auth.methods(),
		"configured secret management client"
	);

	Ok(Arc::new(ClientConfig::new(
		Arc::new(api),
		Arc::new(VesctlSealer::new()),
		resolved.timeout,
	)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorCategory;
	use xcseal_config::{Declared, DEFAULT_TIMEOUT};

	fn env(pairs: &[(&str, &str)]) -> EnvLayer {
		let pairs: Vec<(String, String)> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		EnvLayer::from_lookup(move |name| {
			pairs
				.iter()
				.find(|(k, _)| k == name)
				.map(|(_, v)| v.clone())
		})
	}

	#[test]
	fn configure_uses_default_timeout() {
		let config = configure(
			&ProviderConfigLayer::default(),
			&env(&[("VOLT_API_URL", "https://b.example/api")]),
		)
		.unwrap();
		assert_eq!(config.timeout, DEFAULT_TIMEOUT);
	}

	#[test]
	fn bad_timeout_is_a_configuration_error() {
		let declared = ProviderConfigLayer {
			timeout: Declared::Value("notaduration".to_string()),
			url: Declared::Value("https://a.example/api".to_string()),
			..Default::default()
		};
		let diags = configure(&declared, &env(&[])).unwrap_err();
		assert_eq!(diags.categories(), vec![ErrorCategory::Configuration]);
		assert!(diags.to_string().contains("timeout"));
	}

	#[test]
	fn missing_identity_file_is_a_configuration_error() {
		let declared = ProviderConfigLayer {
			url: Declared::Value("https://a.example/api".to_string()),
			api_cert: Declared::Value("/nonexistent/cert.pem".to_string()),
			api_key: Declared::Value("/nonexistent/key.pem".to_string()),
			..Default::default()
		};
		let diags = configure(&declared, &env(&[])).unwrap_err();
		assert!(diags.has(ErrorCategory::Configuration));
	}
}
