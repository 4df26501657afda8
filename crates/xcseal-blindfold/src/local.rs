// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local checks made before any network or subprocess call.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::SealError;

/// Name searched for on `PATH` when no tool path is declared.
pub const DEFAULT_TOOL: &str = "vesctl";

/// Check that `path` names a readable regular file.
///
/// Missing, directory and unreadable paths are reported as distinct errors.
pub fn validate_plaintext_path(path: &Path) -> Result<(), SealError> {
	trace!(path = %path.display(), "validating plaintext path");
	let metadata = std::fs::metadata(path).map_err(|source| match source.kind() {
		ErrorKind::NotFound => SealError::PlaintextNotFound {
			path: path.to_path_buf(),
		},
		_ => SealError::Read {
			path: path.to_path_buf(),
			source,
		},
	})?;
	if metadata.is_dir() {
		return Err(SealError::IsDirectory {
			path: path.to_path_buf(),
		});
	}
	File::open(path).map_err(|source| SealError::Read {
		path: path.to_path_buf(),
		source,
	})?;
	Ok(())
}

/// Resolve the sealing tool.
///
/// An explicit path containing a separator must point at a file. A bare name
/// (explicit or the [`DEFAULT_TOOL`]) is searched for on `PATH`.
pub fn locate_tool(explicit: Option<&Path>) -> Result<PathBuf, SealError> {
	let requested = explicit
		.filter(|p| !p.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new(DEFAULT_TOOL));

	if requested.components().count() > 1 || requested.is_absolute() {
		if requested.is_file() {
			debug!(tool = %requested.display(), "using declared sealing tool");
			return Ok(requested.to_path_buf());
		}
		return Err(SealError::ToolNotFound {
			tool: requested.display().to_string(),
			reason: "path does not exist or is not a file".to_string(),
		});
	}

	let found = which::which(requested).map_err(|e| SealError::ToolNotFound {
		tool: requested.display().to_string(),
		reason: format!("not found in PATH: {e}"),
	})?;
	debug!(tool = %found.display(), "found sealing tool in PATH");
	Ok(found)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_path_is_not_found() {
		let err = validate_plaintext_path(Path::new("/tmp/doesnotexist/plaintext")).unwrap_err();
		assert!(matches!(err, SealError::PlaintextNotFound { .. }));
	}

	#[test]
	fn directory_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let err = validate_plaintext_path(dir.path()).unwrap_err();
		assert!(matches!(err, SealError::IsDirectory { .. }));
	}

	#[test]
	fn regular_file_is_accepted() {
		let file = tempfile::NamedTempFile::new().unwrap();
		std::fs::write(file.path(), b"plaintext").unwrap();
		validate_plaintext_path(file.path()).unwrap();
	}

	#[cfg(unix)]
	#[test]
	fn unreadable_file_is_a_read_error() {
		use std::os::unix::fs::PermissionsExt;

		let file = tempfile::NamedTempFile::new().unwrap();
		std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000)).unwrap();
		// root ignores file modes, so only assert when the open really fails
		if File::open(file.path()).is_err() {
			let err = validate_plaintext_path(file.path()).unwrap_err();
			assert!(matches!(err, SealError::Read { .. }));
		}
	}

	#[test]
	fn explicit_missing_tool_is_not_found() {
		let err = locate_tool(Some(Path::new("/nonexistent/bin/vesctl"))).unwrap_err();
		assert!(matches!(err, SealError::ToolNotFound { .. }));
	}

	#[test]
	fn explicit_tool_file_is_used_verbatim() {
		let file = tempfile::NamedTempFile::new().unwrap();
		assert_eq!(locate_tool(Some(file.path())).unwrap(), file.path());
	}

	#[test]
	fn bare_name_not_on_path_is_not_found() {
		let err = locate_tool(Some(Path::new("vesctl-definitely-not-installed-xyz"))).unwrap_err();
		match err {
			SealError::ToolNotFound { tool, .. } => {
				assert_eq!(tool, "vesctl-definitely-not-installed-xyz")
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}
}
