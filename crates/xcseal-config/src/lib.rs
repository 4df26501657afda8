// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider configuration for xcseal.
//!
//! Six provider attributes (`api_p12_file`, `api_cert`, `api_key`,
//! `api_token`, `timeout`, `url`) may be declared or left to their `VOLT_*`
//! environment fallbacks. [`resolve`] merges the two into a
//! [`ResolvedConfig`], reporting every problem it finds in one pass.

pub mod declared;
pub mod env;
pub mod error;
pub mod resolve;

pub use declared::{Declared, ProviderConfigLayer};
pub use env::EnvLayer;
pub use error::{ConfigError, ConfigErrors};
pub use resolve::{
	parse_timeout, resolve, AuthMaterial, PemIdentity, Pkcs12Identity, ResolvedConfig,
	DEFAULT_TIMEOUT,
};
