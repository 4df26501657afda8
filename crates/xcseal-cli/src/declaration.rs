// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The TOML declaration file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use xcseal_api::PolicyRef;
use xcseal_common_secret::SecretString;
use xcseal_config::ProviderConfigLayer;
use xcseal_provider::{Declaration, FilePlaintext, InlinePlaintext, FILE_KIND, INLINE_KIND};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
	#[serde(default)]
	pub provider: ProviderConfigLayer,
	#[serde(default)]
	pub blindfold: Vec<InlineBlock>,
	#[serde(default)]
	pub blindfold_file: Vec<FileBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InlineBlock {
	pub name: String,
	/// Standard base64.
	pub plaintext: SecretString,
	pub policy_document: PolicyRef,
	#[serde(default)]
	pub vesctl: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileBlock {
	pub name: String,
	pub path: PathBuf,
	pub policy_document: PolicyRef,
	#[serde(default)]
	pub vesctl: Option<PathBuf>,
}

/// Declared resources of both kinds.
#[derive(Debug, Default)]
pub struct Declarations {
	pub inline: Vec<Declaration<InlinePlaintext>>,
	pub file: Vec<Declaration<FilePlaintext>>,
}

impl Declarations {
	pub fn len(&self) -> usize {
		self.inline.len() + self.file.len()
	}
}

impl DeclarationFile {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read declaration file {}", path.display()))?;
		Self::parse(&raw).with_context(|| format!("invalid declaration file {}", path.display()))
	}

	pub fn parse(raw: &str) -> Result<Self> {
		Ok(toml::from_str(raw)?)
	}

	/// Split into provider settings and validated resource declarations.
	pub fn into_parts(self) -> Result<(ProviderConfigLayer, Declarations)> {
		check_names(INLINE_KIND, self.blindfold.iter().map(|b| b.name.as_str()))?;
		check_names(FILE_KIND, self.blindfold_file.iter().map(|b| b.name.as_str()))?;

		let inline = self
			.blindfold
			.into_iter()
			.map(|b| Declaration {
				name: b.name,
				source: InlinePlaintext::new(b.plaintext),
				policy_document: b.policy_document,
				vesctl: declared_tool(b.vesctl),
			})
			.collect();
		let file = self
			.blindfold_file
			.into_iter()
			.map(|b| Declaration {
				name: b.name,
				source: FilePlaintext::new(b.path),
				policy_document: b.policy_document,
				vesctl: declared_tool(b.vesctl),
			})
			.collect();

		Ok((self.provider, Declarations { inline, file }))
	}
}

// An empty path means "search PATH", same as leaving it out.
fn declared_tool(vesctl: Option<PathBuf>) -> Option<PathBuf> {
	vesctl.filter(|p| !p.as_os_str().is_empty())
}

fn check_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
	let mut seen = HashSet::new();
	for name in names {
		if name.is_empty() {
			bail!("{kind} resource with an empty name");
		}
		if !name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
		{
			bail!("{kind} resource name '{name}' may only contain letters, digits, '_' and '-'");
		}
		if !seen.insert(name) {
			bail!("duplicate {kind} resource '{name}'");
		}
	}
	Ok(())
}
