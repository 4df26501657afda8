// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Documents returned by the secret management API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a secret policy by name and namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRef {
	pub name: String,
	pub namespace: String,
}

impl PolicyRef {
	pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			namespace: namespace.into(),
		}
	}
}

impl fmt::Display for PolicyRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.namespace, self.name)
	}
}

/// The tenant's public blindfold key.
///
/// The full response body is kept because the sealing tool consumes it as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKey {
	pub key_version: Option<u64>,
	pub tenant: Option<String>,
	document: Value,
}

impl PublicKey {
	/// Interpret a `get_public_key` response. A missing, null or empty
	/// `public_key` object means the account has no key.
	pub fn from_response(body: Value) -> Option<Self> {
		let key = match body.get("public_key") {
			Some(Value::Object(key)) if !key.is_empty() => key,
			_ => return None,
		};
		Some(Self {
			key_version: key.get("key_version").and_then(Value::as_u64),
			tenant: key.get("tenant").and_then(Value::as_str).map(str::to_string),
			document: body,
		})
	}

	pub fn document(&self) -> &Value {
		&self.document
	}
}

/// A secret policy document, consulted at seal time to decide who may unseal.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretPolicyDocument {
	pub name: String,
	pub namespace: String,
	pub policy_id: Option<String>,
	document: Value,
}

impl SecretPolicyDocument {
	/// Interpret a `get_policy_document` response. A response without a `data`
	/// object means the policy does not exist.
	pub fn from_response(policy: &PolicyRef, body: Value) -> Option<Self> {
		if !matches!(body.get("data"), Some(Value::Object(_))) {
			return None;
		}
		let text = |field: &str| body.get(field).and_then(Value::as_str).map(str::to_string);
		Some(Self {
			name: text("name").unwrap_or_else(|| policy.name.clone()),
			namespace: text("namespace").unwrap_or_else(|| policy.namespace.clone()),
			policy_id: text("policy_id"),
			document: body,
		})
	}

	pub fn document(&self) -> &Value {
		&self.document
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn public_key_fields_are_extracted() {
		let key = PublicKey::from_response(json!({
			"public_key": {
				"key_version": 3,
				"modulus_base64": "AQAB",
				"public_exponent_base64": "AQAB",
				"tenant": "acme-abcdef"
			}
		}))
		.unwrap();
		assert_eq!(key.key_version, Some(3));
		assert_eq!(key.tenant.as_deref(), Some("acme-abcdef"));
		assert!(key.document().get("public_key").is_some());
	}

	#[test]
	fn null_or_empty_public_key_is_absent() {
		assert!(PublicKey::from_response(json!({ "public_key": null })).is_none());
		assert!(PublicKey::from_response(json!({ "public_key": {} })).is_none());
		assert!(PublicKey::from_response(json!({})).is_none());
	}

	#[test]
	fn policy_document_requires_data() {
		let policy = PolicyRef::new("ves-io-allow-volterra", "shared");
		assert!(SecretPolicyDocument::from_response(&policy, json!({ "name": "x" })).is_none());

		let doc = SecretPolicyDocument::from_response(
			&policy,
			json!({ "data": { "policy_id": "p-1" }, "policy_id": "p-1" }),
		)
		.unwrap();
		assert_eq!(doc.name, "ves-io-allow-volterra");
		assert_eq!(doc.namespace, "shared");
		assert_eq!(doc.policy_id.as_deref(), Some("p-1"));
	}

	#[test]
	fn policy_ref_displays_namespace_first() {
		assert_eq!(PolicyRef::new("allow", "shared").to_string(), "shared/allow");
	}
}
