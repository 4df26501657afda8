// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use crate::resource::{Declaration, SealedSecret};
use crate::source::PlaintextSource;

/// What reconciling a declaration against tracked state will do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlannedAction {
	/// Nothing tracked yet.
	Create,
	/// Declared inputs match the tracked state.
	NoOp,
	/// Finalize the tracked state and materialize a new one.
	Replace { changed: Vec<&'static str> },
	/// Tracked but no longer declared.
	Delete,
}

impl PlannedAction {
	/// Whether applying this action calls the remote API or the sealer.
	pub fn materializes(&self) -> bool {
		matches!(self, PlannedAction::Create | PlannedAction::Replace { .. })
	}
}

impl fmt::Display for PlannedAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PlannedAction::Create => f.write_str("create"),
			PlannedAction::NoOp => f.write_str("no changes"),
			PlannedAction::Replace { changed } => {
				write!(f, "replace (forced by {})", changed.join(", "))
			}
			PlannedAction::Delete => f.write_str("destroy"),
		}
	}
}

/// Declared attributes that differ from the tracked state.
///
/// All of them are immutable, so any entry forces replacement.
pub fn changed_fields<S: PlaintextSource>(
	declared: &Declaration<S>,
	prior: &SealedSecret<S::Record>,
) -> Vec<&'static str> {
	let mut changed = Vec::new();
	if declared.source.record() != prior.source {
		changed.push(S::FIELD);
	}
	if declared.policy_document != prior.policy_document {
		changed.push("policy_document");
	}
	if declared.vesctl != prior.vesctl {
		changed.push("vesctl");
	}
	changed
}

pub fn plan<S: PlaintextSource>(
	declared: Option<&Declaration<S>>,
	prior: Option<&SealedSecret<S::Record>>,
) -> PlannedAction {
	match (declared, prior) {
		(Some(_), None) => PlannedAction::Create,
		(None, Some(_)) => PlannedAction::Delete,
		(None, None) => PlannedAction::NoOp,
		(Some(declared), Some(prior)) => {
			let changed = changed_fields(declared, prior);
			if changed.is_empty() {
				PlannedAction::NoOp
			} else {
				PlannedAction::Replace { changed }
			}
		}
	}
}
