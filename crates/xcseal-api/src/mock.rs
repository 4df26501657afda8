// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::client::SecretManagementApi;
use crate::error::{ApiError, ApiResult};
use crate::types::{PolicyRef, PublicKey, SecretPolicyDocument};

/// Recorded call to the mock API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
	GetPublicKey,
	GetSecretPolicyDocument(PolicyRef),
}

/// In-memory secret management API for tests.
///
/// By default both lookups succeed with [`sample_public_key`] and a policy
/// document built by [`sample_policy_document`] for whatever reference is
/// requested.
#[derive(Clone)]
pub struct MockSecretManagementApi {
	/// Key returned by `get_public_key`; `None` means the account has no key.
	pub public_key: Option<PublicKey>,
	/// Whether `get_secret_policy_document` finds the requested policy.
	pub policy_exists: bool,
	/// If set, `get_public_key` fails with this message.
	pub key_error: Option<String>,
	/// If set, `get_secret_policy_document` fails with this message.
	pub policy_error: Option<String>,
	/// Artificial latency applied to every call.
	pub delay: Option<Duration>,
	/// Track calls for verification.
	pub calls: Arc<Mutex<Vec<ApiCall>>>,
}

impl MockSecretManagementApi {
	pub fn new() -> Self {
		Self {
			public_key: Some(sample_public_key()),
			policy_exists: true,
			key_error: None,
			policy_error: None,
			delay: None,
			calls: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn without_public_key(mut self) -> Self {
		self.public_key = None;
		self
	}

	pub fn without_policy(mut self) -> Self {
		self.policy_exists = false;
		self
	}

	pub fn with_key_error(mut self, message: impl Into<String>) -> Self {
		self.key_error = Some(message.into());
		self
	}

	pub fn with_policy_error(mut self, message: impl Into<String>) -> Self {
		self.policy_error = Some(message.into());
		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	/// All calls made so far, in order.
	pub fn calls(&self) -> Vec<ApiCall> {
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: ApiCall) {
		self.calls.lock().unwrap().push(call);
	}

	async fn wait(&self) {
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
	}
}

impl Default for MockSecretManagementApi {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SecretManagementApi for MockSecretManagementApi {
	async fn get_public_key(&self) -> ApiResult<Option<PublicKey>> {
		self.record(ApiCall::GetPublicKey);
		self.wait().await;
		if let Some(message) = &self.key_error {
			return Err(ApiError::Status {
				status: 503,
				body: message.clone(),
			});
		}
		Ok(self.public_key.clone())
	}

	async fn get_secret_policy_document(
		&self,
		policy: &PolicyRef,
	) -> ApiResult<Option<SecretPolicyDocument>> {
		self.record(ApiCall::GetSecretPolicyDocument(policy.clone()));
		self.wait().await;
		if let Some(message) = &self.policy_error {
			return Err(ApiError::Status {
				status: 503,
				body: message.clone(),
			});
		}
		Ok(self.policy_exists.then(|| sample_policy_document(policy)))
	}
}

/// A well-formed public key response.
pub fn sample_public_key() -> PublicKey {
	PublicKey::from_response(json!({
		"public_key": {
			"key_version": 1,
			"modulus_base64": "xGHbNkcm2ysOh4jV0Sj0bQ==",
			"public_exponent_base64": "AQAB",
			"tenant": "acme-abcdefgh"
		}
	}))
	.expect("sample key is well formed")
}

/// A well-formed policy document response for `policy`.
pub fn sample_policy_document(policy: &PolicyRef) -> SecretPolicyDocument {
	SecretPolicyDocument::from_response(
		policy,
		json!({
			"name": policy.name,
			"namespace": policy.namespace,
			"policy_id": format!("{}-{}", policy.namespace, policy.name),
			"tenant": "acme-abcdefgh",
			"data": {
				"policy_id": format!("{}-{}", policy.namespace, policy.name),
				"policy_info": { "algo": "FIRST_RULE_MATCH", "rules": [] }
			}
		}),
	)
	.expect("sample policy document is well formed")
}
