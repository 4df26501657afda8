// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runs [`VesctlSealer`] against shell scripts standing in for vesctl.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use base64::prelude::*;
use tempfile::TempDir;
use xcseal_api::{sample_policy_document, sample_public_key, PolicyRef};
use xcseal_blindfold::{PlaintextInput, SealError, Sealer, VesctlSealer};
use xcseal_common_secret::SecretBytes;

/// Echoes the plaintext back base64-encoded after checking its arguments.
const ECHO_SCRIPT: &str = r#"#!/bin/sh
[ "$1 $2 $3 $4 $6" = "request secrets encrypt --policy-document --public-key" ] || {
	echo "unexpected arguments: $*" >&2
	exit 2
}
grep -q policy_info "$5" || { echo "bad policy document" >&2; exit 3; }
grep -q public_key "$7" || { echo "bad public key" >&2; exit 4; }
echo "Encrypted Secret (Base64 encoded):"
base64 < "$8" | tr -d '\n'
echo
"#;

fn install_tool(dir: &TempDir, body: &str) -> PathBuf {
	let path = dir.path().join("vesctl");
	std::fs::write(&path, body).unwrap();
	std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
	path
}

async fn seal_bytes(tool: &Path, plaintext: &[u8]) -> Result<String, SealError> {
	let bytes = SecretBytes::new(plaintext.to_vec());
	let policy = sample_policy_document(&PolicyRef::new("ves-io-allow-volterra", "shared"));
	VesctlSealer::new()
		.seal(tool, PlaintextInput::Bytes(&bytes), &sample_public_key(), &policy)
		.await
}

#[tokio::test]
async fn bytes_are_staged_and_sealed() {
	let dir = TempDir::new().unwrap();
	let tool = install_tool(&dir, ECHO_SCRIPT);

	let sealed = seal_bytes(&tool, b"super secret").await.unwrap();
	assert_eq!(BASE64_STANDARD.decode(sealed).unwrap(), b"super secret");
}

#[tokio::test]
async fn file_plaintext_is_passed_by_path() {
	let dir = TempDir::new().unwrap();
	let tool = install_tool(&dir, ECHO_SCRIPT);
	let plaintext = dir.path().join("secret.txt");
	std::fs::write(&plaintext, b"from a file").unwrap();

	let policy = sample_policy_document(&PolicyRef::new("ves-io-allow-volterra", "shared"));
	let sealed = VesctlSealer::new()
		.seal(
			&tool,
			PlaintextInput::File(&plaintext),
			&sample_public_key(),
			&policy,
		)
		.await
		.unwrap();
	assert_eq!(BASE64_STANDARD.decode(sealed).unwrap(), b"from a file");
}

#[tokio::test]
async fn non_zero_exit_reports_stderr() {
	let dir = TempDir::new().unwrap();
	let tool = install_tool(&dir, "#!/bin/sh\necho 'policy denied' >&2\nexit 1\n");

	match seal_bytes(&tool, b"x").await.unwrap_err() {
		SealError::Failed { stderr, .. } => assert_eq!(stderr, "policy denied"),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn garbage_output_is_malformed() {
	let dir = TempDir::new().unwrap();
	let tool = install_tool(&dir, "#!/bin/sh\necho 'this is not *base64*'\n");

	let err = seal_bytes(&tool, b"x").await.unwrap_err();
	assert!(matches!(err, SealError::MalformedOutput { .. }));
}

#[tokio::test]
async fn missing_tool_is_not_found() {
	let dir = TempDir::new().unwrap();
	let err = seal_bytes(&dir.path().join("vesctl"), b"x").await.unwrap_err();
	assert!(matches!(err, SealError::ToolNotFound { .. }));
}

#[test]
fn locate_accepts_an_installed_script() {
	let dir = TempDir::new().unwrap();
	let tool = install_tool(&dir, ECHO_SCRIPT);
	assert_eq!(VesctlSealer::new().locate(Some(&tool)).unwrap(), tool);
}
