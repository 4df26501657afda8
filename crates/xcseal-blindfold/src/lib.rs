// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blindfold sealing through the `vesctl` CLI.
//!
//! [`Sealer`] is the seam the lifecycle code depends on. [`VesctlSealer`] runs
//! the real tool; [`MockSealer`] records calls for tests.

mod error;
mod local;
mod mock;
mod sealer;
mod vesctl;

pub use error::SealError;
pub use local::{locate_tool, validate_plaintext_path, DEFAULT_TOOL};
pub use mock::{MockPlaintext, MockSealer, SealCall, MOCK_TOOL_PATH};
pub use sealer::{PlaintextInput, Sealer};
pub use vesctl::{parse_sealed_output, VesctlSealer, OUTPUT_BANNER};
