// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use xcseal_provider::{
	plan, BlindfoldResource, ClientConfig, Declaration, Diagnostics, FilePlaintext,
	InlinePlaintext, PlaintextSource, PlannedAction, Reconciled, SealedSecret, StateFile,
	StoredResource,
};

use crate::declaration::Declarations;

/// Per-resource result of a command.
#[derive(Debug, Default)]
pub struct Report {
	pub actions: Vec<(String, PlannedAction)>,
	pub failures: Vec<(String, Diagnostics)>,
}

impl Report {
	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Work out what `apply` would do without touching anything.
pub fn plan_all(decls: &Declarations, state: &StateFile) -> Report {
	let mut report = Report::default();
	plan_kind(&decls.inline, state, &mut report);
	plan_kind(&decls.file, state, &mut report);
	for address in orphans(decls, state) {
		report.actions.push((address, PlannedAction::Delete));
	}
	report
}

fn plan_kind<S: PlaintextSource>(decls: &[Declaration<S>], state: &StateFile, report: &mut Report) {
	for declared in decls {
		let address = declared.address();
		let prior = state
			.resources
			.get(&address)
			.cloned()
			.and_then(S::from_stored);
		report
			.actions
			.push((address, plan(Some(declared), prior.as_ref())));
	}
}

/// Tracked addresses with no declaration.
fn orphans(decls: &Declarations, state: &StateFile) -> Vec<String> {
	let declared: HashSet<String> = decls
		.inline
		.iter()
		.map(Declaration::address)
		.chain(decls.file.iter().map(Declaration::address))
		.collect();
	state
		.resources
		.keys()
		.filter(|address| !declared.contains(*address))
		.cloned()
		.collect()
}

/// Reconcile every declaration against `state`, updating it in place.
///
/// Resources run concurrently. Failed ones are left untracked.
pub async fn apply(
	client: Arc<ClientConfig>,
	decls: &Declarations,
	state: &mut StateFile,
	cancel: &CancellationToken,
) -> Report {
	let mut report = Report::default();

	for address in orphans(decls, state) {
		if let Some(stored) = state.resources.remove(&address) {
			finalize_stored(&client, stored);
			report.actions.push((address, PlannedAction::Delete));
		}
	}

	let inline = BlindfoldResource::<InlinePlaintext>::new(Arc::clone(&client));
	let file = BlindfoldResource::<FilePlaintext>::new(Arc::clone(&client));
	let inline_work = take_priors(&decls.inline, state);
	let file_work = take_priors(&decls.file, state);

	let (inline_results, file_results) = futures::join!(
		join_all(
			inline_work
				.into_iter()
				.map(|(declared, prior)| reconcile_one(&inline, declared, prior, cancel))
		),
		join_all(
			file_work
				.into_iter()
				.map(|(declared, prior)| reconcile_one(&file, declared, prior, cancel))
		),
	);

	collect::<InlinePlaintext>(inline_results, state, &mut report);
	collect::<FilePlaintext>(file_results, state, &mut report);
	report
}

type Outcome<R> = (String, Result<Reconciled<R>, Diagnostics>);

fn take_priors<'a, S: PlaintextSource>(
	decls: &'a [Declaration<S>],
	state: &mut StateFile,
) -> Vec<(&'a Declaration<S>, Option<SealedSecret<S::Record>>)> {
	decls
		.iter()
		.map(|declared| {
			let prior = state
				.resources
				.remove(&declared.address())
				.and_then(S::from_stored);
			(declared, prior)
		})
		.collect()
}

async fn reconcile_one<S: PlaintextSource>(
	resource: &BlindfoldResource<S>,
	declared: &Declaration<S>,
	prior: Option<SealedSecret<S::Record>>,
	cancel: &CancellationToken,
) -> Outcome<S::Record> {
	(
		declared.address(),
		resource.reconcile(declared, prior, cancel).await,
	)
}

fn collect<S: PlaintextSource>(
	results: Vec<Outcome<S::Record>>,
	state: &mut StateFile,
	report: &mut Report,
) {
	for (address, result) in results {
		match result {
			Ok(reconciled) => {
				state
					.resources
					.insert(address.clone(), S::into_stored(reconciled.state));
				report.actions.push((address, reconciled.action));
			}
			Err(diags) => report.failures.push((address, diags)),
		}
	}
}

/// Refresh every tracked resource. The sealed values are never re-read.
pub fn refresh(client: Arc<ClientConfig>, state: &mut StateFile) -> Report {
	let inline = BlindfoldResource::<InlinePlaintext>::new(Arc::clone(&client));
	let file = BlindfoldResource::<FilePlaintext>::new(client);
	let mut report = Report::default();
	for (address, stored) in state.resources.iter_mut() {
		*stored = match stored.clone() {
			StoredResource::Inline(s) => StoredResource::Inline(inline.refresh(s)),
			StoredResource::File(s) => StoredResource::File(file.refresh(s)),
		};
		report.actions.push((address.clone(), PlannedAction::NoOp));
	}
	debug!(resources = state.resources.len(), "refreshed tracked state");
	report
}

/// Finalize every tracked resource and clear the state.
pub fn destroy(client: Arc<ClientConfig>, state: &mut StateFile) -> Report {
	let mut report = Report::default();
	for (address, stored) in std::mem::take(&mut state.resources) {
		finalize_stored(&client, stored);
		report.actions.push((address, PlannedAction::Delete));
	}
	info!(resources = report.actions.len(), "destroyed tracked resources");
	report
}

fn finalize_stored(client: &Arc<ClientConfig>, stored: StoredResource) {
	match stored {
		StoredResource::Inline(s) => {
			BlindfoldResource::<InlinePlaintext>::new(Arc::clone(client)).finalize(s)
		}
		StoredResource::File(s) => {
			BlindfoldResource::<FilePlaintext>::new(Arc::clone(client)).finalize(s)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use xcseal_api::{MockSecretManagementApi, PolicyRef};
	use xcseal_blindfold::MockSealer;

	fn client(api: &MockSecretManagementApi, sealer: &MockSealer) -> Arc<ClientConfig> {
		Arc::new(ClientConfig::new(
			Arc::new(api.clone()),
			Arc::new(sealer.clone()),
			Duration::from_secs(20),
		))
	}

	fn inline(name: &str, plaintext: &str) -> Declaration<InlinePlaintext> {
		Declaration {
			name: name.to_string(),
			source: InlinePlaintext::new(plaintext),
			policy_document: PolicyRef::new("ves-io-allow-volterra", "shared"),
			vesctl: None,
		}
	}

	#[tokio::test]
	async fn apply_creates_then_is_stable() {
		let api = MockSecretManagementApi::new();
		let sealer = MockSealer::new();
		let decls = Declarations {
			inline: vec![inline("a", "c2VjcmV0"), inline("b", "b3RoZXI=")],
			file: vec![],
		};
		let mut state = StateFile::default();
		let cancel = CancellationToken::new();

		let first = apply(client(&api, &sealer), &decls, &mut state, &cancel).await;
		assert!(first.is_success());
		assert_eq!(state.resources.len(), 2);
		assert!(first
			.actions
			.iter()
			.all(|(_, action)| *action == PlannedAction::Create));

		let snapshot = state.clone();
		let plan = plan_all(&decls, &state);
		assert!(plan
			.actions
			.iter()
			.all(|(_, action)| *action == PlannedAction::NoOp));

		let second = apply(client(&api, &sealer), &decls, &mut state, &cancel).await;
		assert!(second.is_success());
		assert_eq!(state, snapshot);
		assert_eq!(sealer.calls().len(), 2);
	}

	#[tokio::test]
	async fn apply_drops_undeclared_and_failed_resources() {
		let api = MockSecretManagementApi::new();
		let sealer = MockSealer::new();
		let cancel = CancellationToken::new();
		let mut state = StateFile::default();

		let both = Declarations {
			inline: vec![inline("keep", "c2VjcmV0"), inline("gone", "c2VjcmV0")],
			file: vec![],
		};
		apply(client(&api, &sealer), &both, &mut state, &cancel).await;

		let next = Declarations {
			inline: vec![inline("keep", "c2VjcmV0")],
			file: vec![Declaration {
				name: "missing".to_string(),
				source: FilePlaintext::new("/tmp/doesnotexist/plaintext"),
				policy_document: PolicyRef::new("ves-io-allow-volterra", "shared"),
				vesctl: None,
			}],
		};
		let plan = plan_all(&next, &state);
		assert!(plan.actions.contains(&(
			"f5xc_blindfold.gone".to_string(),
			PlannedAction::Delete
		)));

		let report = apply(client(&api, &sealer), &next, &mut state, &cancel).await;
		assert!(!report.is_success());
		assert_eq!(report.failures[0].0, "f5xc_blindfold_file.missing");
		assert_eq!(
			state.resources.keys().collect::<Vec<_>>(),
			vec!["f5xc_blindfold.keep"]
		);
	}

	#[tokio::test]
	async fn refresh_and_destroy_make_no_remote_calls() {
		let api = MockSecretManagementApi::new();
		let sealer = MockSealer::new();
		let decls = Declarations {
			inline: vec![inline("a", "c2VjcmV0")],
			file: vec![],
		};
		let mut state = StateFile::default();
		apply(client(&api, &sealer), &decls, &mut state, &CancellationToken::new()).await;
		let calls = (api.calls().len(), sealer.calls().len());
		let snapshot = state.clone();

		refresh(client(&api, &sealer), &mut state);
		assert_eq!(state, snapshot);

		let report = destroy(client(&api, &sealer), &mut state);
		assert_eq!(report.actions.len(), 1);
		assert!(state.resources.is_empty());
		assert_eq!((api.calls().len(), sealer.calls().len()), calls);
	}
}
