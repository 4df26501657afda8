// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	#[error(
		"unknown value for {field}: the provider cannot build the API client until it is known; \
		 set it statically or use the {env_var} environment variable"
	)]
	Unknown {
		field: &'static str,
		env_var: &'static str,
	},

	#[error(
		"missing value for {field}: set it in the provider configuration or use the {env_var} \
		 environment variable, and make sure it is not empty"
	)]
	Missing {
		field: &'static str,
		env_var: &'static str,
	},

	#[error("invalid value for {field}: {cause}")]
	InvalidValue { field: &'static str, cause: String },
}

impl ConfigError {
	/// Name of the provider attribute the error is attached to.
	pub fn field(&self) -> &'static str {
		match self {
			ConfigError::Unknown { field, .. }
			| ConfigError::Missing { field, .. }
			| ConfigError::InvalidValue { field, .. } => field,
		}
	}
}

/// Every configuration error found in one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(Vec<ConfigError>);

impl ConfigErrors {
	pub(crate) fn new(errors: Vec<ConfigError>) -> Self {
		Self(errors)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn fields(&self) -> Vec<&'static str> {
		self.0.iter().map(ConfigError::field).collect()
	}
}

impl fmt::Display for ConfigErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, err) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{err}")?;
		}
		Ok(())
	}
}

impl std::error::Error for ConfigErrors {}

impl IntoIterator for ConfigErrors {
	type Item = ConfigError;
	type IntoIter = std::vec::IntoIter<ConfigError>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl From<ConfigError> for ConfigErrors {
	fn from(err: ConfigError) -> Self {
		Self(vec![err])
	}
}
