// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SealError {
	#[error("plaintext file does not exist at {path}")]
	PlaintextNotFound { path: PathBuf },

	#[error("plaintext path {path} is a directory, not a file")]
	IsDirectory { path: PathBuf },

	#[error("unable to read plaintext file at {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("sealing tool {tool} not found: {reason}")]
	ToolNotFound { tool: String, reason: String },

	#[error("failed to stage sealing inputs: {0}")]
	Staging(#[source] io::Error),

	#[error("failed to run {tool}: {source}")]
	Spawn {
		tool: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("{tool} exited with {status}: {stderr}")]
	Failed {
		tool: PathBuf,
		status: String,
		stderr: String,
	},

	#[error("{tool} produced malformed output: {reason}")]
	MalformedOutput { tool: PathBuf, reason: String },
}
