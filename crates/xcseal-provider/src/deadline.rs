// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Why a bounded call did not produce its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupted {
	TimedOut(Duration),
	Cancelled,
}

/// Run `fut` under its own deadline, abandoning it early if `cancel` fires.
///
/// The timer and the in-flight future are dropped before this returns.
pub async fn bounded<F>(
	timeout: Duration,
	cancel: &CancellationToken,
	fut: F,
) -> Result<F::Output, Interrupted>
where
	F: Future,
{
	if cancel.is_cancelled() {
		return Err(Interrupted::Cancelled);
	}
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(Interrupted::Cancelled),
		res = tokio::time::timeout(timeout, fut) => res.map_err(|_| Interrupted::TimedOut(timeout)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn completes_within_deadline() {
		let token = CancellationToken::new();
		let out = bounded(Duration::from_secs(1), &token, async { 7 }).await;
		assert_eq!(out, Ok(7));
	}

	#[tokio::test(start_paused = true)]
	async fn slow_call_times_out() {
		let token = CancellationToken::new();
		let out = bounded(Duration::from_millis(50), &token, async {
			tokio::time::sleep(Duration::from_secs(60)).await;
		})
		.await;
		assert_eq!(out, Err(Interrupted::TimedOut(Duration::from_millis(50))));
	}

	#[tokio::test]
	async fn cancelled_token_short_circuits() {
		let token = CancellationToken::new();
		token.cancel();
		let out = bounded(Duration::from_secs(1), &token, async { 7 }).await;
		assert_eq!(out, Err(Interrupted::Cancelled));
	}

	#[tokio::test(start_paused = true)]
	async fn cancellation_interrupts_in_flight_call() {
		let token = CancellationToken::new();
		let child = token.clone();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(10)).await;
			child.cancel();
		});
		let out = bounded(Duration::from_secs(60), &token, async {
			tokio::time::sleep(Duration::from_secs(30)).await;
		})
		.await;
		assert_eq!(out, Err(Interrupted::Cancelled));
	}
}
