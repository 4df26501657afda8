// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider attributes as declared in configuration.

use serde::{Deserialize, Deserializer};
use xcseal_common_secret::SecretString;

/// A declared attribute value.
///
/// `Null` means the attribute was not set and the environment may supply it.
/// `Unknown` means the attribute references something not yet determined;
/// the provider cannot be configured until it is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Declared<T> {
	#[default]
	Null,
	Unknown,
	Value(T),
}

impl<T> Declared<T> {
	pub fn is_unknown(&self) -> bool {
		matches!(self, Declared::Unknown)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Declared::Null)
	}

	pub fn as_value(&self) -> Option<&T> {
		match self {
			Declared::Value(v) => Some(v),
			_ => None,
		}
	}
}

impl<T> From<Option<T>> for Declared<T> {
	fn from(value: Option<T>) -> Self {
		value.map_or(Declared::Null, Declared::Value)
	}
}

impl<'de, T> Deserialize<'de> for Declared<T>
where
	T: Deserialize<'de>,
{
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Option::<T>::deserialize(deserializer).map(Declared::from)
	}
}

/// The `[provider]` block: six optional attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfigLayer {
	#[serde(default)]
	pub api_p12_file: Declared<String>,
	#[serde(default)]
	pub api_cert: Declared<String>,
	#[serde(default)]
	pub api_key: Declared<String>,
	#[serde(default)]
	pub api_token: Declared<SecretString>,
	#[serde(default)]
	pub timeout: Declared<String>,
	#[serde(default)]
	pub url: Declared<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_attributes_are_null() {
		let layer: ProviderConfigLayer = toml::from_str(r#"url = "https://a.example/api""#).unwrap();
		assert_eq!(layer.url, Declared::Value("https://a.example/api".to_string()));
		assert!(layer.timeout.is_null());
		assert!(layer.api_token.is_null());
	}

	#[test]
	fn explicit_empty_string_is_a_value() {
		let layer: ProviderConfigLayer = toml::from_str(r#"timeout = """#).unwrap();
		assert_eq!(layer.timeout.as_value().map(String::as_str), Some(""));
	}

	#[test]
	fn token_is_read_but_not_printed() {
		let layer: ProviderConfigLayer = toml::from_str(r#"api_token = "abc123""#).unwrap();
		assert_eq!(layer.api_token.as_value().unwrap().expose(), "abc123");
		assert!(!format!("{layer:?}").contains("abc123"));
	}
}
