// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP implementation of the secret management API.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Identity, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use xcseal_common_secret::SecretString;
use xcseal_config::ResolvedConfig;

use crate::error::{ApiError, ApiResult};
use crate::types::{PolicyRef, PublicKey, SecretPolicyDocument};

/// Longest response excerpt carried into an error message.
const ERROR_BODY_LIMIT: usize = 200;

/// The two reads the sealing lifecycle needs.
///
/// Both distinguish "absent" (`Ok(None)`) from a failed call (`Err`).
#[async_trait]
pub trait SecretManagementApi: Send + Sync {
	/// Fetch the account's current public key.
	async fn get_public_key(&self) -> ApiResult<Option<PublicKey>>;

	/// Fetch the named secret policy document.
	async fn get_secret_policy_document(
		&self,
		policy: &PolicyRef,
	) -> ApiResult<Option<SecretPolicyDocument>>;
}

/// Returns the User-Agent sent with every request.
pub fn user_agent() -> String {
	format!("xcseal/{}", env!("CARGO_PKG_VERSION"))
}

/// reqwest-backed client bound to one endpoint and one set of credentials.
pub struct HttpApiClient {
	http: Client,
	base_url: Url,
	token: Option<SecretString>,
}

impl HttpApiClient {
	/// Build a client from resolved provider configuration.
	///
	/// A PEM certificate/key pair is used as the TLS identity when present,
	/// otherwise a PKCS#12 bundle. The API token header is sent whenever a
	/// token is configured, regardless of the TLS identity.
	pub fn new(config: &ResolvedConfig) -> ApiResult<Self> {
		let base_url = Url::parse(&config.url).map_err(|e| ApiError::Configuration {
			field: "url",
			cause: format!("'{}' is not a valid URL: {e}", config.url),
		})?;
		if base_url.cannot_be_a_base() {
			return Err(ApiError::Configuration {
				field: "url",
				cause: format!("'{}' cannot be used as a base URL", config.url),
			});
		}

		let mut builder = Client::builder()
			.user_agent(user_agent())
			.connect_timeout(config.timeout)
			.redirect(reqwest::redirect::Policy::none());

		if let Some(pem) = &config.auth.pem {
			let mut bundle = read_identity_file("api_cert", &pem.cert)?;
			bundle.push(b'\n');
			bundle.extend(read_identity_file("api_key", &pem.key)?);
			let identity = Identity::from_pem(&bundle).map_err(|e| ApiError::Configuration {
				field: "api_cert",
				cause: format!("unable to load certificate/key pair: {e}"),
			})?;
			if config.auth.pkcs12.is_some() {
				debug!("certificate/key pair takes precedence over the PKCS#12 bundle");
			}
			builder = builder.use_rustls_tls().identity(identity);
		} else if let Some(p12) = &config.auth.pkcs12 {
			let der = read_identity_file("api_p12_file", &p12.path)?;
			let identity = Identity::from_pkcs12_der(&der, p12.passphrase.expose()).map_err(|e| {
				ApiError::Configuration {
					field: "api_p12_file",
					cause: format!("unable to load PKCS#12 bundle: {e}"),
				}
			})?;
			builder = builder.use_native_tls().identity(identity);
		}

		let http = builder.build().map_err(|e| ApiError::Configuration {
			field: "url",
			cause: format!("failed to create HTTP client: {e}"),
		})?;

		Ok(Self {
			http,
			base_url,
			token: config.auth.token.clone(),
		})
	}

	fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| ApiError::Configuration {
				field: "url",
				cause: "cannot be used as a base URL".to_string(),
			})?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// GET a JSON document; 404 maps to `Ok(None)`.
	async fn get_json(&self, url: Url) -> ApiResult<Option<Value>> {
		debug!(url = %url, "sending request");

		let mut request = self.http.get(url).header(ACCEPT, "application/json");
		if let Some(token) = &self.token {
			request = request.header(AUTHORIZATION, format!("APIToken {}", token.expose()));
		}
		let response = request.send().await?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			debug!("resource not found");
			return Ok(None);
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			warn!(status = %status, "secret management API returned an error");
			return Err(ApiError::Status {
				status: status.as_u16(),
				body: sanitize_body_for_error(&body, ERROR_BODY_LIMIT),
			});
		}

		let bytes = response.bytes().await?;
		serde_json::from_slice(&bytes)
			.map(Some)
			.map_err(|e| ApiError::InvalidResponse(e.to_string()))
	}
}

#[async_trait]
impl SecretManagementApi for HttpApiClient {
	#[instrument(skip(self))]
	async fn get_public_key(&self) -> ApiResult<Option<PublicKey>> {
		let url = self.endpoint(&["secret_management", "get_public_key"])?;
		let key = self.get_json(url).await?.and_then(PublicKey::from_response);
		debug!(found = key.is_some(), "fetched public key");
		Ok(key)
	}

	#[instrument(skip(self), fields(policy = %policy))]
	async fn get_secret_policy_document(
		&self,
		policy: &PolicyRef,
	) -> ApiResult<Option<SecretPolicyDocument>> {
		let url = self.endpoint(&[
			"secret_management",
			"namespaces",
			&policy.namespace,
			"secret_policys",
			&policy.name,
			"get_policy_document",
		])?;
		let document = self
			.get_json(url)
			.await?
			.and_then(|body| SecretPolicyDocument::from_response(policy, body));
		debug!(found = document.is_some(), "fetched secret policy document");
		Ok(document)
	}
}

impl std::fmt::Debug for HttpApiClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HttpApiClient")
			.field("base_url", &self.base_url.as_str())
			.field("has_token", &self.token.is_some())
			.finish()
	}
}

fn read_identity_file(field: &'static str, path: &Path) -> ApiResult<Vec<u8>> {
	std::fs::read(path).map_err(|e| ApiError::Configuration {
		field,
		cause: format!("failed to read {}: {e}", path.display()),
	})
}

fn sanitize_body_for_error(body: &str, max_len: usize) -> String {
	let sanitized: String = body
		.chars()
		.filter(|c| !c.is_control() || *c == ' ')
		.take(max_len)
		.collect();
	if body.chars().count() > max_len {
		format!("{sanitized}...")
	} else {
		sanitized
	}
}
