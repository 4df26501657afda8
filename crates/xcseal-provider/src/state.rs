// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracked resource state on disk.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::resource::SealedSecret;
use crate::source::{FileRecord, InlineRecord};

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StateError {
	#[error("failed to read state file {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write state file {}: {source}", path.display())]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("state file {} is not valid: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("state file version {found} is not supported (expected {STATE_VERSION})")]
	UnsupportedVersion { found: u32 },
}

/// A tracked resource of either kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoredResource {
	#[serde(rename = "f5xc_blindfold")]
	Inline(SealedSecret<InlineRecord>),
	#[serde(rename = "f5xc_blindfold_file")]
	File(SealedSecret<FileRecord>),
}

impl StoredResource {
	pub fn id(&self) -> uuid::Uuid {
		match self {
			StoredResource::Inline(s) => s.id,
			StoredResource::File(s) => s.id,
		}
	}
}

/// `<kind>.<name>`, the key a resource is tracked under.
pub fn address(kind: &str, name: &str) -> String {
	format!("{kind}.{name}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
	pub version: u32,
	#[serde(default)]
	pub resources: BTreeMap<String, StoredResource>,
}

impl Default for StateFile {
	fn default() -> Self {
		Self {
			version: STATE_VERSION,
			resources: BTreeMap::new(),
		}
	}
}

impl StateFile {
	/// Load state from `path`. A missing file is an empty state.
	pub fn load(path: &Path) -> Result<Self, StateError> {
		let raw = match std::fs::read(path) {
			Ok(raw) => raw,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!(path = %path.display(), "no state file, starting empty");
				return Ok(Self::default());
			}
			Err(source) => {
				return Err(StateError::Read {
					path: path.to_path_buf(),
					source,
				})
			}
		};
		let state: StateFile = serde_json::from_slice(&raw).map_err(|source| StateError::Parse {
			path: path.to_path_buf(),
			source,
		})?;
		if state.version != STATE_VERSION {
			return Err(StateError::UnsupportedVersion {
				found: state.version,
			});
		}
		debug!(path = %path.display(), resources = state.resources.len(), "loaded state");
		Ok(state)
	}

	/// Write state to `path` atomically: a sibling temp file renamed over it.
	pub fn save(&self, path: &Path) -> Result<(), StateError> {
		let write_err = |source| StateError::Write {
			path: path.to_path_buf(),
			source,
		};
		let dir = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};
		let body = serde_json::to_vec_pretty(self).map_err(|source| StateError::Parse {
			path: path.to_path_buf(),
			source,
		})?;

		let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
		tmp.write_all(&body).map_err(write_err)?;
		tmp.write_all(b"\n").map_err(write_err)?;
		tmp.as_file().sync_all().map_err(write_err)?;
		tmp.persist(path).map_err(|e| write_err(e.error))?;

		debug!(path = %path.display(), resources = self.resources.len(), "saved state");
		Ok(())
	}
}
