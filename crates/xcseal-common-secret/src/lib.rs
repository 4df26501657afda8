// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for the sensitive values that flow through a seal.
//!
//! API tokens, the PKCS#12 passphrase and decoded plaintext bytes are all
//! carried in a [`Secret<T>`]. The wrapper:
//!
//! - prints [`REDACTED`] for both `Debug` and `Display`, so `tracing` fields
//!   such as `token = %token` never leak the value,
//! - serializes as [`REDACTED`], so a secret can never end up in a state file,
//! - zeroes its memory on drop,
//! - has no `Deref`; callers reach the value through [`Secret::expose`].
//!
//! ```
//! use xcseal_common_secret::{SecretBytes, REDACTED};
//!
//! let plaintext = SecretBytes::new(b"hunter2".to_vec());
//! assert_eq!(format!("{plaintext}"), REDACTED);
//! assert_eq!(plaintext.expose(), b"hunter2");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Placeholder rendered wherever a secret would otherwise be printed.
pub const REDACTED: &str = "(sensitive value)";

/// A sensitive value that is redacted in output and zeroed on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// Secret text, e.g. an API token or the base64 plaintext as declared.
pub type SecretString = Secret<String>;

/// Secret bytes, e.g. decoded plaintext waiting to be sealed.
pub type SecretBytes = Secret<Vec<u8>>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Borrow the protected value. Every call site is an intentional exposure.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// True when the secret holds no text; empty tokens count as "not set".
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl SecretBytes {
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Secret({REDACTED})")
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Zeroize,
	{
		fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_hide_token() {
		let token = SecretString::from("tenant-api-token");
		assert_eq!(format!("{token}"), REDACTED);
		assert_eq!(format!("{token:?}"), format!("Secret({REDACTED})"));
	}

	#[test]
	fn option_wrapped_secret_stays_redacted() {
		let passphrase: Option<SecretString> = Some("p12-passphrase".into());
		let debug = format!("{passphrase:?}");
		assert!(!debug.contains("p12-passphrase"));
	}

	#[test]
	fn bytes_expose_and_len() {
		let plaintext = SecretBytes::new(vec![0xde, 0xad, 0xbe, 0xef]);
		assert_eq!(plaintext.len(), 4);
		assert!(!plaintext.is_empty());
		assert_eq!(plaintext.expose(), &[0xde, 0xad, 0xbe, 0xef]);
	}

	#[test]
	fn empty_string_reports_empty() {
		assert!(SecretString::from("").is_empty());
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serialize_writes_placeholder_only() {
		let token = SecretString::from("tenant-api-token");
		let json = serde_json::to_string(&token).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));
	}

	#[cfg(feature = "serde")]
	#[test]
	fn deserialize_keeps_value() {
		let token: SecretString = serde_json::from_str("\"abc\"").unwrap();
		assert_eq!(token.expose(), "abc");
	}

	proptest! {
		#[test]
		fn formatting_never_contains_value(inner in "[a-zA-Z0-9_+/=-]{4,64}") {
			prop_assume!(!format!("Secret({REDACTED})").contains(&inner));
			let secret = SecretString::new(inner.clone());
			let displayed = format!("{}", secret);
			let debugged = format!("{:?}", secret);
			prop_assert!(!displayed.contains(&inner));
			prop_assert!(!debugged.contains(&inner));
		}
	}
}
