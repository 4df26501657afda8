// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lifecycle errors and the diagnostics collection they are reported in.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use xcseal_blindfold::SealError;
use xcseal_config::{ConfigError, ConfigErrors};

/// Coarse classification of a [`LifecycleError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
	Configuration,
	NotFound,
	IsDirectory,
	Read,
	Transport,
	ToolNotFound,
	Seal,
	Cancelled,
}

impl ErrorCategory {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorCategory::Configuration => "configuration",
			ErrorCategory::NotFound => "not_found",
			ErrorCategory::IsDirectory => "is_directory",
			ErrorCategory::Read => "read",
			ErrorCategory::Transport => "transport",
			ErrorCategory::ToolNotFound => "tool_not_found",
			ErrorCategory::Seal => "seal",
			ErrorCategory::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for ErrorCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What a [`LifecycleError::NotFound`] failed to find.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingObject {
	PublicKey,
	SecretPolicyDocument,
	PlaintextFile,
}

impl fmt::Display for MissingObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			MissingObject::PublicKey => "public key",
			MissingObject::SecretPolicyDocument => "secret policy document",
			MissingObject::PlaintextFile => "plaintext file",
		})
	}
}

#[derive(Debug, Error)]
pub enum LifecycleError {
	#[error("invalid configuration for {field}: {cause}")]
	Configuration { field: String, cause: String },

	#[error("{kind} not found: {reference}")]
	NotFound {
		kind: MissingObject,
		reference: String,
	},

	#[error("plaintext path {} is a directory, not a file", path.display())]
	IsDirectory { path: PathBuf },

	#[error("unable to read {}: {cause}", path.display())]
	Read { path: PathBuf, cause: String },

	#[error("{operation} failed: {cause}")]
	Transport {
		operation: &'static str,
		cause: String,
	},

	#[error("sealing tool not found: {cause}")]
	ToolNotFound { cause: String },

	#[error("failed to blindfold data: {cause}")]
	Seal { cause: String },

	#[error("{operation} was cancelled")]
	Cancelled { operation: &'static str },
}

impl LifecycleError {
	pub fn category(&self) -> ErrorCategory {
		match self {
			LifecycleError::Configuration { .. } => ErrorCategory::Configuration,
			LifecycleError::NotFound { .. } => ErrorCategory::NotFound,
			LifecycleError::IsDirectory { .. } => ErrorCategory::IsDirectory,
			LifecycleError::Read { .. } => ErrorCategory::Read,
			LifecycleError::Transport { .. } => ErrorCategory::Transport,
			LifecycleError::ToolNotFound { .. } => ErrorCategory::ToolNotFound,
			LifecycleError::Seal { .. } => ErrorCategory::Seal,
			LifecycleError::Cancelled { .. } => ErrorCategory::Cancelled,
		}
	}

	/// One-line headline shown above the detail when reporting.
	pub fn summary(&self) -> &'static str {
		match self {
			LifecycleError::Configuration { .. } => "Invalid provider or resource configuration",
			LifecycleError::NotFound {
				kind: MissingObject::PublicKey,
				..
			} => "Error retrieving PublicKey",
			LifecycleError::NotFound {
				kind: MissingObject::SecretPolicyDocument,
				..
			} => "Error retrieving SecretPolicyDocument",
			LifecycleError::NotFound {
				kind: MissingObject::PlaintextFile,
				..
			} => "Error plaintext file does not exist",
			LifecycleError::IsDirectory { .. } => "Error plaintext file is a directory",
			LifecycleError::Read { .. } => "Error verifying plaintext exists",
			LifecycleError::Transport { .. } => "Error calling the secret management API",
			LifecycleError::ToolNotFound { .. } => "Error locating vesctl",
			LifecycleError::Seal { .. } => "Error blindfolding data",
			LifecycleError::Cancelled { .. } => "Operation cancelled",
		}
	}
}

impl From<ConfigError> for LifecycleError {
	fn from(err: ConfigError) -> Self {
		LifecycleError::Configuration {
			field: err.field().to_string(),
			cause: err.to_string(),
		}
	}
}

impl From<SealError> for LifecycleError {
	fn from(err: SealError) -> Self {
		match err {
			SealError::PlaintextNotFound { path } => LifecycleError::NotFound {
				kind: MissingObject::PlaintextFile,
				reference: path.display().to_string(),
			},
			SealError::IsDirectory { path } => LifecycleError::IsDirectory { path },
			SealError::Read { path, source } => LifecycleError::Read {
				path,
				cause: source.to_string(),
			},
			SealError::ToolNotFound { tool, reason } => LifecycleError::ToolNotFound {
				cause: format!("{tool}: {reason}"),
			},
			other => LifecycleError::Seal {
				cause: other.to_string(),
			},
		}
	}
}

/// Every error reported by one logical operation.
#[derive(Debug, Default)]
pub struct Diagnostics(Vec<LifecycleError>);

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, err: impl Into<LifecycleError>) {
		self.0.push(err.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, LifecycleError> {
		self.0.iter()
	}

	pub fn categories(&self) -> Vec<ErrorCategory> {
		self.0.iter().map(LifecycleError::category).collect()
	}

	pub fn has(&self, category: ErrorCategory) -> bool {
		self.0.iter().any(|e| e.category() == category)
	}

	/// `Ok(())` when nothing was reported, otherwise `Err(self)`.
	pub fn into_result(self) -> Result<(), Diagnostics> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(self)
		}
	}
}

impl From<LifecycleError> for Diagnostics {
	fn from(err: LifecycleError) -> Self {
		Self(vec![err])
	}
}

impl From<ConfigErrors> for Diagnostics {
	fn from(errs: ConfigErrors) -> Self {
		Self(errs.into_iter().map(LifecycleError::from).collect())
	}
}

impl IntoIterator for Diagnostics {
	type Item = LifecycleError;
	type IntoIter = std::vec::IntoIter<LifecycleError>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl fmt::Display for Diagnostics {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, err) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{}: {err}", err.summary())?;
		}
		Ok(())
	}
}

impl std::error::Error for Diagnostics {}
