// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use xcseal_api::{PublicKey, SecretPolicyDocument};
use xcseal_common_secret::SecretBytes;

use crate::error::SealError;

/// Plaintext handed to a [`Sealer`].
#[derive(Clone, Copy, Debug)]
pub enum PlaintextInput<'a> {
	/// Raw bytes held in memory.
	Bytes(&'a SecretBytes),
	/// A file the tool reads directly.
	File(&'a Path),
}

/// Abstraction over the external sealing tool.
#[async_trait]
pub trait Sealer: Send + Sync {
	/// Resolve the tool binary, honouring an explicitly declared path.
	fn locate(&self, explicit: Option<&Path>) -> Result<PathBuf, SealError>;

	/// Seal `plaintext` against `key` and `policy`, returning the base64 sealed
	/// payload.
	async fn seal(
		&self,
		tool: &Path,
		plaintext: PlaintextInput<'_>,
		key: &PublicKey,
		policy: &SecretPolicyDocument,
	) -> Result<String, SealError>;
}
