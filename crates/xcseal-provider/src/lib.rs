// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lifecycle of `f5xc_blindfold` and `f5xc_blindfold_file` resources.
//!
//! [`configure`] resolves provider settings into a shared [`ClientConfig`].
//! A [`BlindfoldResource`] then materializes, refreshes, reconciles and
//! finalizes declarations of one kind; the kinds differ only in their
//! [`PlaintextSource`].
//!
//! ```ignore
//! let client = configure(&declared, &EnvLayer::from_env())?;
//! let resource = BlindfoldResource::<InlinePlaintext>::new(client);
//! let state = resource.materialize(&declaration, &cancel).await?;
//! ```

pub mod deadline;
pub mod error;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod source;
pub mod state;

pub use error::{Diagnostics, ErrorCategory, LifecycleError, MissingObject};
pub use plan::{changed_fields, plan, PlannedAction};
pub use provider::{configure, ClientConfig};
pub use resource::{BlindfoldResource, Declaration, Reconciled, SealedSecret};
pub use source::{
	FilePlaintext, FileRecord, InlinePlaintext, InlineRecord, PlaintextSource, FILE_KIND,
	INLINE_KIND,
};
pub use state::{address, StateError, StateFile, StoredResource, STATE_VERSION};
