// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where a resource's plaintext comes from.
//!
//! The two resource kinds differ only here: [`InlinePlaintext`] decodes a
//! declared base64 value, [`FilePlaintext`] hands a validated path to the
//! sealing tool.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use base64::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use xcseal_blindfold::{validate_plaintext_path, PlaintextInput};
use xcseal_common_secret::{SecretBytes, SecretString};

use crate::error::LifecycleError;
use crate::resource::SealedSecret;
use crate::state::StoredResource;

pub const INLINE_KIND: &str = "f5xc_blindfold";
pub const FILE_KIND: &str = "f5xc_blindfold_file";

pub trait PlaintextSource: Send + Sync {
	/// Resource type name used in addresses and state.
	const KIND: &'static str;

	/// Declared attribute whose change is reported when [`Self::Record`]
	/// differs.
	const FIELD: &'static str;

	/// What is kept in state to detect a change of source.
	type Record: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

	/// Plaintext ready to hand to the sealer.
	type Prepared: Send + Sync;

	fn record(&self) -> Self::Record;

	/// Local pre-flight. Must not touch the network.
	fn prepare(&self) -> Result<Self::Prepared, LifecycleError>;

	fn input(prepared: &Self::Prepared) -> PlaintextInput<'_>;

	fn into_stored(state: SealedSecret<Self::Record>) -> StoredResource;

	fn from_stored(stored: StoredResource) -> Option<SealedSecret<Self::Record>>;
}

/// Plaintext declared inline as standard base64.
#[derive(Clone, Debug)]
pub struct InlinePlaintext {
	encoded: SecretString,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRecord {
	/// Hex SHA-256 of the declared encoded value.
	pub plaintext_sha256: String,
}

impl InlinePlaintext {
	pub fn new(encoded: impl Into<SecretString>) -> Self {
		Self {
			encoded: encoded.into(),
		}
	}
}

impl PlaintextSource for InlinePlaintext {
	const KIND: &'static str = INLINE_KIND;
	const FIELD: &'static str = "plaintext";

	type Record = InlineRecord;
	type Prepared = SecretBytes;

	fn record(&self) -> InlineRecord {
		InlineRecord {
			plaintext_sha256: hex::encode(Sha256::digest(self.encoded.expose().as_bytes())),
		}
	}

	fn prepare(&self) -> Result<SecretBytes, LifecycleError> {
		BASE64_STANDARD
			.decode(self.encoded.expose())
			.map(SecretBytes::new)
			.map_err(|e| LifecycleError::Configuration {
				field: Self::FIELD.to_string(),
				cause: format!("failed to decode base64 plaintext: {e}"),
			})
	}

	fn input(prepared: &SecretBytes) -> PlaintextInput<'_> {
		PlaintextInput::Bytes(prepared)
	}

	fn into_stored(state: SealedSecret<InlineRecord>) -> StoredResource {
		StoredResource::Inline(state)
	}

	fn from_stored(stored: StoredResource) -> Option<SealedSecret<InlineRecord>> {
		match stored {
			StoredResource::Inline(state) => Some(state),
			StoredResource::File(_) => None,
		}
	}
}

/// Plaintext read by the sealing tool from a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePlaintext {
	path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
	pub path: PathBuf,
}

impl FilePlaintext {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl PlaintextSource for FilePlaintext {
	const KIND: &'static str = FILE_KIND;
	const FIELD: &'static str = "path";

	type Record = FileRecord;
	type Prepared = PathBuf;

	fn record(&self) -> FileRecord {
		FileRecord {
			path: self.path.clone(),
		}
	}

	fn prepare(&self) -> Result<PathBuf, LifecycleError> {
		validate_plaintext_path(&self.path)?;
		Ok(self.path.clone())
	}

	fn input(prepared: &PathBuf) -> PlaintextInput<'_> {
		PlaintextInput::File(prepared)
	}

	fn into_stored(state: SealedSecret<FileRecord>) -> StoredResource {
		StoredResource::File(state)
	}

	fn from_stored(stored: StoredResource) -> Option<SealedSecret<FileRecord>> {
		match stored {
			StoredResource::File(state) => Some(state),
			StoredResource::Inline(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorCategory;

	#[test]
	fn inline_decodes_standard_base64() {
		let source = InlinePlaintext::new("aHVudGVyMg==");
		assert_eq!(source.prepare().unwrap().expose(), b"hunter2");
	}

	#[test]
	fn inline_rejects_invalid_base64() {
		let err = InlinePlaintext::new("not base64!").prepare().unwrap_err();
		assert_eq!(err.category(), ErrorCategory::Configuration);
	}

	#[test]
	fn inline_record_is_a_digest_not_the_value() {
		let record = InlinePlaintext::new("aHVudGVyMg==").record();
		assert_eq!(record.plaintext_sha256.len(), 64);
		assert!(!record.plaintext_sha256.contains("aHVudGVyMg"));
		assert_ne!(record, InlinePlaintext::new("c2VjcmV0").record());
	}

	#[test]
	fn file_record_is_the_path() {
		let source = FilePlaintext::new("/secrets/tls.key");
		assert_eq!(source.record().path, PathBuf::from("/secrets/tls.key"));
	}

	#[test]
	fn file_prepare_reports_missing_path() {
		let err = FilePlaintext::new("/tmp/doesnotexist/plaintext")
			.prepare()
			.unwrap_err();
		assert_eq!(err.category(), ErrorCategory::NotFound);
	}
}
