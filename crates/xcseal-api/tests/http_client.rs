// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client tests against a wiremock server standing in for the tenant API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xcseal_api::{ApiError, HttpApiClient, PolicyRef, SecretManagementApi};
use xcseal_common_secret::SecretString;
use xcseal_config::{AuthMaterial, ResolvedConfig};

const KEY_PATH: &str = "/api/secret_management/get_public_key";
const POLICY_PATH: &str =
	"/api/secret_management/namespaces/shared/secret_policys/ves-io-allow-volterra/get_policy_document";

fn client(server: &MockServer, token: Option<&str>) -> HttpApiClient {
	let config = ResolvedConfig {
		url: format!("{}/api", server.uri()),
		timeout: Duration::from_secs(5),
		auth: AuthMaterial {
			token: token.map(SecretString::from),
			..Default::default()
		},
	};
	HttpApiClient::new(&config).expect("client builds")
}

fn policy() -> PolicyRef {
	PolicyRef::new("ves-io-allow-volterra", "shared")
}

#[tokio::test]
async fn public_key_is_returned_with_full_document() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(KEY_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"public_key": { "key_version": 7, "modulus_base64": "AA==", "tenant": "acme" }
		})))
		.expect(1)
		.mount(&server)
		.await;

	let key = client(&server, None).get_public_key().await.unwrap().unwrap();
	assert_eq!(key.key_version, Some(7));
	assert_eq!(key.document()["public_key"]["tenant"], "acme");
}

#[tokio::test]
async fn token_is_sent_as_api_token_header() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(KEY_PATH))
		.and(header("authorization", "APIToken s3cr3t"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"public_key": { "key_version": 1 }
		})))
		.expect(1)
		.mount(&server)
		.await;

	let key = client(&server, Some("s3cr3t")).get_public_key().await.unwrap();
	assert!(key.is_some());
}

#[tokio::test]
async fn missing_public_key_is_absent_not_an_error() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(KEY_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "public_key": null })))
		.mount(&server)
		.await;

	assert!(client(&server, None).get_public_key().await.unwrap().is_none());
}

#[tokio::test]
async fn not_found_status_is_absent() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(POLICY_PATH))
		.respond_with(ResponseTemplate::new(404).set_body_string("no such policy"))
		.mount(&server)
		.await;

	let document = client(&server, None)
		.get_secret_policy_document(&policy())
		.await
		.unwrap();
	assert!(document.is_none());
}

#[tokio::test]
async fn policy_document_is_fetched_by_namespace_and_name() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(POLICY_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"name": "ves-io-allow-volterra",
			"namespace": "shared",
			"policy_id": "shared-allow",
			"data": { "policy_id": "shared-allow", "policy_info": { "rules": [] } }
		})))
		.expect(1)
		.mount(&server)
		.await;

	let document = client(&server, None)
		.get_secret_policy_document(&policy())
		.await
		.unwrap()
		.unwrap();
	assert_eq!(document.policy_id.as_deref(), Some("shared-allow"));
	assert_eq!(document.document()["data"]["policy_id"], "shared-allow");
}

#[tokio::test]
async fn server_error_is_a_transport_failure() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(KEY_PATH))
		.respond_with(ResponseTemplate::new(500).set_body_string("upstream\nexploded"))
		.mount(&server)
		.await;

	let err = client(&server, None).get_public_key().await.unwrap_err();
	match err {
		ApiError::Status { status, body } => {
			assert_eq!(status, 500);
			assert_eq!(body, "upstreamexploded");
		}
		other => panic!("unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn non_json_body_is_an_invalid_response() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(KEY_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
		.mount(&server)
		.await;

	let err = client(&server, None).get_public_key().await.unwrap_err();
	assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() {
	let server = MockServer::start().await;
	let api = client(&server, None);
	drop(server);

	let err = api.get_public_key().await.unwrap_err();
	assert!(matches!(err, ApiError::Http(_)));
}
