// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::future::Future;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;
use xcseal_api::{ApiResult, PolicyRef};

use crate::deadline::{bounded, Interrupted};
use crate::error::{Diagnostics, LifecycleError, MissingObject};
use crate::plan::{plan, PlannedAction};
use crate::provider::ClientConfig;
use crate::source::PlaintextSource;
use crate::state::address;

/// A declared blindfold resource.
#[derive(Clone, Debug)]
pub struct Declaration<S> {
	pub name: String,
	pub source: S,
	pub policy_document: PolicyRef,
	/// Explicit sealing tool; `None` searches `PATH`.
	pub vesctl: Option<PathBuf>,
}

impl<S: PlaintextSource> Declaration<S> {
	pub fn address(&self) -> String {
		address(S::KIND, &self.name)
	}
}

/// Tracked state of a materialized resource.
///
/// `id` and `sealed` are only ever produced together by
/// [`BlindfoldResource::materialize`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret<R> {
	pub id: Uuid,
	pub sealed: String,
	#[serde(flatten)]
	pub source: R,
	pub policy_document: PolicyRef,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vesctl: Option<PathBuf>,
}

/// Outcome of [`BlindfoldResource::reconcile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciled<R> {
	pub action: PlannedAction,
	pub state: SealedSecret<R>,
}

/// Lifecycle of one resource kind, shared by the inline and file variants.
pub struct BlindfoldResource<S> {
	client: Arc<ClientConfig>,
	_source: PhantomData<fn() -> S>,
}

impl<S> Clone for BlindfoldResource<S> {
	fn clone(&self) -> Self {
		Self {
			client: Arc::clone(&self.client),
			_source: PhantomData,
		}
	}
}

impl<S: PlaintextSource> BlindfoldResource<S> {
	pub fn new(client: Arc<ClientConfig>) -> Self {
		Self {
			client,
			_source: PhantomData,
		}
	}

	/// Produce a fresh sealed secret for `declared`.
	///
	/// Local checks run first and are reported together; no remote call is
	/// made if any fail. The policy is fetched only after the key lookup has
	/// returned, and the tool runs only once both are present.
	#[instrument(
		skip_all,
		fields(
			resource = %declared.address(),
			policy_doc_name = %declared.policy_document.name,
			policy_doc_namespace = %declared.policy_document.namespace,
			vesctl = ?declared.vesctl,
		)
	)]
	pub async fn materialize(
		&self,
		declared: &Declaration<S>,
		cancel: &CancellationToken,
	) -> Result<SealedSecret<S::Record>, Diagnostics> {
		let id = Uuid::new_v4();
		debug!(%id, "materializing");

		let mut diags = Diagnostics::new();
		let prepared = match declared.source.prepare() {
			Ok(prepared) => Some(prepared),
			Err(e) => {
				diags.push(e);
				None
			}
		};
		let tool = match self.client.sealer.locate(declared.vesctl.as_deref()) {
			Ok(tool) => Some(tool),
			Err(e) => {
				diags.push(e);
				None
			}
		};
		let (Some(prepared), Some(tool)) = (prepared, tool) else {
			warn!(errors = diags.len(), "pre-flight failed, nothing was sent");
			return Err(diags);
		};

		let key = self
			.fetch("get_public_key", cancel, self.client.api.get_public_key())
			.await?
			.ok_or_else(|| LifecycleError::NotFound {
				kind: MissingObject::PublicKey,
				reference: "no public key exists for this account".to_string(),
			})?;

		let policy = self
			.fetch(
				"get_secret_policy_document",
				cancel,
				self.client
					.api
					.get_secret_policy_document(&declared.policy_document),
			)
			.await?
			.ok_or_else(|| LifecycleError::NotFound {
				kind: MissingObject::SecretPolicyDocument,
				reference: format!(
					"{}; check the assigned values for name and namespace",
					declared.policy_document
				),
			})?;

		let sealing = self
			.client
			.sealer
			.seal(&tool, S::input(&prepared), &key, &policy);
		let sealed = match bounded(self.client.timeout, cancel, sealing).await {
			Ok(Ok(sealed)) if !sealed.is_empty() => sealed,
			Ok(Ok(_)) => {
				return Err(LifecycleError::Seal {
					cause: "sealing tool returned an empty payload".to_string(),
				}
				.into())
			}
			Ok(Err(e)) => return Err(LifecycleError::from(e).into()),
			Err(Interrupted::TimedOut(limit)) => {
				return Err(LifecycleError::Seal {
					cause: format!(
						"{} did not finish within {}",
						tool.display(),
						humantime::format_duration(limit)
					),
				}
				.into())
			}
			Err(Interrupted::Cancelled) => {
				return Err(LifecycleError::Cancelled { operation: "seal" }.into())
			}
		};

		info!(%id, key_version = ?key.key_version, "materialized sealed secret");
		Ok(SealedSecret {
			id,
			sealed,
			source: declared.source.record(),
			policy_document: declared.policy_document.clone(),
			vesctl: declared.vesctl.clone(),
		})
	}

	/// The sealed value is never re-read, so refresh keeps state as-is.
	pub fn refresh(&self, state: SealedSecret<S::Record>) -> SealedSecret<S::Record> {
		trace!(id = %state.id, "refresh keeps tracked state");
		state
	}

	/// Bring tracked state in line with `declared`.
	///
	/// Unchanged inputs keep `prior` verbatim. Any change finalizes `prior`
	/// and materializes a replacement; there is no in-place update.
	#[instrument(skip_all, fields(resource = %declared.address()))]
	pub async fn reconcile(
		&self,
		declared: &Declaration<S>,
		prior: Option<SealedSecret<S::Record>>,
		cancel: &CancellationToken,
	) -> Result<Reconciled<S::Record>, Diagnostics> {
		let action = plan(Some(declared), prior.as_ref());
		match (action, prior) {
			(PlannedAction::NoOp, Some(prior)) => {
				debug!(id = %prior.id, "declared inputs unchanged");
				Ok(Reconciled {
					action: PlannedAction::NoOp,
					state: prior,
				})
			}
			(action, prior) => {
				if let Some(prior) = prior {
					info!(id = %prior.id, %action, "replacing");
					self.finalize(prior);
				}
				let state = self.materialize(declared, cancel).await?;
				Ok(Reconciled { action, state })
			}
		}
	}

	/// Drop `state` from tracking. Nothing remote is touched.
	pub fn finalize(&self, state: SealedSecret<S::Record>) {
		info!(id = %state.id, kind = S::KIND, "finalized");
	}

	async fn fetch<T>(
		&self,
		operation: &'static str,
		cancel: &CancellationToken,
		call: impl Future<Output = ApiResult<T>>,
	) -> Result<T, LifecycleError> {
		match bounded(self.client.timeout, cancel, call).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(e)) => Err(LifecycleError::Transport {
				operation,
				cause: e.to_string(),
			}),
			Err(Interrupted::TimedOut(limit)) => Err(LifecycleError::Transport {
				operation,
				cause: format!("timed out after {}", humantime::format_duration(limit)),
			}),
			Err(Interrupted::Cancelled) => Err(LifecycleError::Cancelled { operation }),
		}
	}
}
