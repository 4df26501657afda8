// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use base64::prelude::*;
use tokio::process::Command;
use tracing::{debug, instrument, trace, warn};
use xcseal_api::{PublicKey, SecretPolicyDocument};

use crate::error::SealError;
use crate::local::locate_tool;
use crate::sealer::{PlaintextInput, Sealer};

/// Printed by vesctl ahead of the sealed payload.
pub const OUTPUT_BANNER: &str = "Encrypted Secret (Base64 encoded):";

const PUBLIC_KEY_FILE: &str = "public-key.json";
const POLICY_DOCUMENT_FILE: &str = "policy-document.json";
const PLAINTEXT_FILE: &str = "plaintext";
const MAX_STDERR_CHARS: usize = 1024;

/// Sealer that shells out to `vesctl request secrets encrypt`.
///
/// Inputs are staged in a private temporary directory that is removed when the
/// call returns or its future is dropped. A dropped future also kills the
/// child process.
pub struct VesctlSealer;

impl VesctlSealer {
	pub fn new() -> Self {
		Self
	}
}

impl Default for VesctlSealer {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Sealer for VesctlSealer {
	fn locate(&self, explicit: Option<&Path>) -> Result<PathBuf, SealError> {
		locate_tool(explicit)
	}

	#[instrument(skip_all, fields(tool = %tool.display(), policy = %policy.name))]
	async fn seal(
		&self,
		tool: &Path,
		plaintext: PlaintextInput<'_>,
		key: &PublicKey,
		policy: &SecretPolicyDocument,
	) -> Result<String, SealError> {
		let staging = tempfile::Builder::new()
			.prefix("xcseal-")
			.tempdir()
			.map_err(SealError::Staging)?;

		let key_path = staging.path().join(PUBLIC_KEY_FILE);
		write_json(&key_path, key.document()).await?;
		let policy_path = staging.path().join(POLICY_DOCUMENT_FILE);
		write_json(&policy_path, policy.document()).await?;

		let plaintext_path = match plaintext {
			PlaintextInput::File(path) => path.to_path_buf(),
			PlaintextInput::Bytes(bytes) => {
				// the staging directory is created owner-only
				let path = staging.path().join(PLAINTEXT_FILE);
				tokio::fs::write(&path, bytes.expose())
					.await
					.map_err(SealError::Staging)?;
				path
			}
		};

		let mut cmd = Command::new(tool);
		cmd.args(["request", "secrets", "encrypt", "--policy-document"])
			.arg(&policy_path)
			.arg("--public-key")
			.arg(&key_path)
			.arg(&plaintext_path)
			.stdin(Stdio::null())
			.kill_on_drop(true);

		trace!(plaintext = %plaintext_path.display(), "running sealing tool");

		let output = cmd.output().await.map_err(|source| {
			if source.kind() == std::io::ErrorKind::NotFound {
				warn!("sealing tool disappeared before it could run");
				SealError::ToolNotFound {
					tool: tool.display().to_string(),
					reason: source.to_string(),
				}
			} else {
				SealError::Spawn {
					tool: tool.to_path_buf(),
					source,
				}
			}
		})?;

		if !output.status.success() {
			let stderr = String::from_utf8_lossy(&output.stderr);
			return Err(SealError::Failed {
				tool: tool.to_path_buf(),
				status: output.status.to_string(),
				stderr: truncate(stderr.trim(), MAX_STDERR_CHARS),
			});
		}

		let stdout = String::from_utf8_lossy(&output.stdout);
		let sealed = parse_sealed_output(&stdout).map_err(|reason| SealError::MalformedOutput {
			tool: tool.to_path_buf(),
			reason,
		})?;

		debug!(sealed_len = sealed.len(), "sealed plaintext");
		Ok(sealed)
	}
}

async fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), SealError> {
	let body = serde_json::to_vec(value)
		.map_err(|e| SealError::Staging(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
	tokio::fs::write(path, body)
		.await
		.map_err(SealError::Staging)
}

fn truncate(s: &str, max_chars: usize) -> String {
	match s.char_indices().nth(max_chars) {
		Some((idx, _)) => format!("{}...", &s[..idx]),
		None => s.to_string(),
	}
}

/// Extract the sealed payload from vesctl stdout.
///
/// The output is an optional [`OUTPUT_BANNER`] followed by exactly one base64
/// token. Anything else is rejected.
pub fn parse_sealed_output(stdout: &str) -> Result<String, String> {
	let payload = match stdout.find(OUTPUT_BANNER) {
		Some(idx) => &stdout[idx + OUTPUT_BANNER.len()..],
		None => stdout,
	};

	let mut tokens = payload.split_whitespace();
	let sealed = tokens
		.next()
		.ok_or_else(|| "no sealed payload in output".to_string())?;
	if tokens.next().is_some() {
		return Err("unexpected trailing output after sealed payload".to_string());
	}

	BASE64_STANDARD
		.decode(sealed)
		.map_err(|e| format!("sealed payload is not base64: {e}"))?;
	Ok(sealed.to_string())
}
