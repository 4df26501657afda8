// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! xcseal: seal secrets with F5 Distributed Cloud blindfold.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xcseal_config::EnvLayer;
use xcseal_provider::{configure, StateFile};

mod commands;
mod declaration;

use commands::Report;
use declaration::DeclarationFile;

/// Seal secrets with F5 Distributed Cloud blindfold
#[derive(Parser, Debug)]
#[command(name = "xcseal", version, about, long_about = None)]
struct Args {
	/// Declaration file
	#[arg(short, long, env = "XCSEAL_CONFIG", default_value = "xcseal.toml")]
	config: PathBuf,

	/// Tracked state file
	#[arg(short, long, env = "XCSEAL_STATE", default_value = "xcseal.state.json")]
	state: PathBuf,

	/// Log level (RUST_LOG takes precedence)
	#[arg(short, long, env = "XCSEAL_LOG", value_enum, default_value_t = LogLevel::Info)]
	log_level: LogLevel,

	/// Log output format
	#[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
	log_format: LogFormat,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
	/// Show what apply would do
	Plan,
	/// Create or replace declared resources and save state
	Apply,
	/// Refresh tracked state
	Refresh,
	/// Finalize every tracked resource
	Destroy,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
	Pretty,
	Compact,
	Json,
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

fn init_tracing(level: LogLevel, format: LogFormat) {
	let level = log_level_to_tracing(level);
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"warn,xcseal={level},xcseal_config={level},xcseal_api={level},\
			 xcseal_blindfold={level},xcseal_provider={level}"
		))
	});

	match format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();
	init_tracing(args.log_level, args.log_format);

	let (provider, decls) = DeclarationFile::load(&args.config)?.into_parts()?;
	let mut state = StateFile::load(&args.state)?;
	info!(
		config = %args.config.display(),
		state = %args.state.display(),
		declared = decls.len(),
		tracked = state.resources.len(),
		"loaded declarations and state"
	);

	let client = match configure(&provider, &EnvLayer::from_env()) {
		Ok(client) => client,
		Err(diags) => {
			print_report(&Report {
				actions: Vec::new(),
				failures: vec![("provider".to_string(), diags)],
			});
			return Ok(ExitCode::FAILURE);
		}
	};

	let cancel = CancellationToken::new();
	let on_signal = cancel.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			warn!("interrupt received, cancelling in-flight calls");
			on_signal.cancel();
		}
	});

	let report = match args.command {
		Command::Plan => commands::plan_all(&decls, &state),
		Command::Apply => commands::apply(client, &decls, &mut state, &cancel).await,
		Command::Refresh => commands::refresh(client, &mut state),
		Command::Destroy => commands::destroy(client, &mut state),
	};

	if args.command != Command::Plan {
		state
			.save(&args.state)
			.with_context(|| format!("failed to save state to {}", args.state.display()))?;
	}
	print_report(&report);

	Ok(if report.is_success() {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}

fn print_report(report: &Report) {
	for (address, action) in &report.actions {
		println!("{address}: {action}");
	}
	for (address, diags) in &report.failures {
		for err in diags.iter() {
			eprintln!("error: {address}: {}", err.summary());
			eprintln!("  {err}");
		}
	}
}
