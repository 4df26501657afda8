// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::*;
use xcseal_api::{PolicyRef, PublicKey, SecretPolicyDocument};

use crate::error::SealError;
use crate::sealer::{PlaintextInput, Sealer};

/// Path reported by [`MockSealer::locate`] when nothing is declared.
pub const MOCK_TOOL_PATH: &str = "/usr/local/bin/vesctl";

/// Plaintext as seen by the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockPlaintext {
	Bytes(Vec<u8>),
	File(PathBuf),
}

/// Recorded call to the mock sealer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealCall {
	pub tool: PathBuf,
	pub plaintext: MockPlaintext,
	pub key_version: Option<u64>,
	pub policy: PolicyRef,
}

/// Mock sealer for testing.
///
/// Each successful seal returns a distinct payload, so a replacement can be
/// told apart from a kept value.
#[derive(Clone)]
pub struct MockSealer {
	/// Whether a tool is found when no explicit path is declared.
	pub tool_installed: bool,
	/// If set, `seal` fails with this stderr.
	pub failure: Option<String>,
	/// Artificial latency applied to every seal.
	pub delay: Option<Duration>,
	/// Track calls for verification.
	pub calls: Arc<Mutex<Vec<SealCall>>>,
	counter: Arc<AtomicUsize>,
}

impl MockSealer {
	pub fn new() -> Self {
		Self {
			tool_installed: true,
			failure: None,
			delay: None,
			calls: Arc::new(Mutex::new(Vec::new())),
			counter: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn not_installed(mut self) -> Self {
		self.tool_installed = false;
		self
	}

	pub fn failing(mut self, stderr: impl Into<String>) -> Self {
		self.failure = Some(stderr.into());
		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	/// All seal calls made so far, in order.
	pub fn calls(&self) -> Vec<SealCall> {
		self.calls.lock().unwrap().clone()
	}

	/// The payload the `n`th successful seal returns (1-based).
	pub fn sealed_value(n: usize) -> String {
		BASE64_STANDARD.encode(format!("sealed-{n}"))
	}
}

impl Default for MockSealer {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Sealer for MockSealer {
	fn locate(&self, explicit: Option<&Path>) -> Result<PathBuf, SealError> {
		match explicit.filter(|p| !p.as_os_str().is_empty()) {
			Some(path) => Ok(path.to_path_buf()),
			None if self.tool_installed => Ok(PathBuf::from(MOCK_TOOL_PATH)),
			None => Err(SealError::ToolNotFound {
				tool: crate::local::DEFAULT_TOOL.to_string(),
				reason: "not found in PATH".to_string(),
			}),
		}
	}

	async fn seal(
		&self,
		tool: &Path,
		plaintext: PlaintextInput<'_>,
		key: &PublicKey,
		policy: &SecretPolicyDocument,
	) -> Result<String, SealError> {
		let plaintext = match plaintext {
			PlaintextInput::Bytes(bytes) => MockPlaintext::Bytes(bytes.expose().clone()),
			PlaintextInput::File(path) => MockPlaintext::File(path.to_path_buf()),
		};
		self.calls.lock().unwrap().push(SealCall {
			tool: tool.to_path_buf(),
			plaintext,
			key_version: key.key_version,
			policy: PolicyRef::new(policy.name.clone(), policy.namespace.clone()),
		});

		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}

		if let Some(stderr) = &self.failure {
			return Err(SealError::Failed {
				tool: tool.to_path_buf(),
				status: "exit status: 1".to_string(),
				stderr: stderr.clone(),
			});
		}

		let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
		Ok(Self::sealed_value(n))
	}
}
