//! `localhist` command line front end.
//!
//! Each invocation opens the history file, runs one command through the
//! host adapter, and exits. Files are identified by their canonical path.

mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use localhist_chain::Clock as _;
use localhist_chain::SystemClock;
use localhist_host::{
	HostCommand, HostError, HostResponse, LocalHistory, RestoreMode, Settings, default_settings_path,
};
use tracing::{debug, info};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "localhist", version)]
#[command(about = "Per-file local history stored as patch chains")]
struct Args {
	/// Settings file (defaults to the platform config directory)
	#[arg(short, long, value_name = "PATH", global = true)]
	config: Option<PathBuf>,

	/// History file, overriding storePath from the settings
	#[arg(short, long, value_name = "PATH", global = true)]
	store: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Record the file's current content
	Save {
		file: PathBuf,
	},
	/// Record the file's current content as a named snapshot
	Snapshot {
		file: PathBuf,
		/// Name for the revision
		#[arg(short, long)]
		label: Option<String>,
	},
	/// List recorded revisions, newest first
	Log {
		file: PathBuf,
	},
	/// Print a historic version (negative index prints the base)
	Show {
		file: PathBuf,
		#[arg(allow_negative_numbers = true)]
		index: i64,
	},
	/// Diff a historic version against the file on disk
	Diff {
		file: PathBuf,
		#[arg(allow_negative_numbers = true)]
		index: i64,
	},
	/// Overwrite the file with a historic version and record it
	Restore {
		file: PathBuf,
		#[arg(allow_negative_numbers = true)]
		index: i64,
	},
	/// Label a revision (an empty label clears it)
	Rename {
		file: PathBuf,
		index: usize,
		label: String,
	},
	/// Drop revisions older than the given number of days
	Cleanup {
		#[arg(short, long, default_value_t = 30)]
		days: u32,
	},
	/// Set the per-file revision cap and trim every history to it
	Retain {
		max: usize,
	},
	/// List tracked files
	Files,
	/// Replay every history and report damaged ones
	Check,
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let settings = load_settings(&args)?;
	let history = LocalHistory::open_default(settings).context("failed to open local history")?;
	debug!(path = %history.storage().path().display(), "using history file");

	run(&history, args.command)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("localhist=debug")
		} else {
			EnvFilter::new("localhist=info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
	let mut settings = match args.config.clone().or_else(default_settings_path) {
		Some(path) => Settings::load(&path)?,
		None => Settings::default(),
	};
	if let Some(store) = &args.store {
		settings.store_path = Some(store.clone());
	}
	Ok(settings)
}

fn run(history: &LocalHistory, command: Command) -> anyhow::Result<()> {
	match command {
		Command::Save { file } => {
			let (file, content) = read_tracked(&file)?;
			report(history.handle(HostCommand::Save { file, content }))
		}
		Command::Snapshot { file, label } => {
			let (file, content) = read_tracked(&file)?;
			report(history.handle(HostCommand::Snapshot {
				file,
				content,
				label,
			}))
		}
		Command::Log { file } => report(history.handle(HostCommand::ViewHistory {
			file: file_id(&file)?,
		})),
		Command::Show { file, index } => report(history.handle(HostCommand::Restore {
			file: file_id(&file)?,
			index,
			mode: RestoreMode::NewTab,
		})),
		Command::Diff { file, index } => {
			let (file, current) = read_tracked(&file)?;
			report(history.handle(HostCommand::Compare {
				file,
				index,
				current,
			}))
		}
		Command::Restore { file: path, index } => {
			let response = history.handle(HostCommand::Restore {
				file: file_id(&path)?,
				index,
				mode: RestoreMode::InPlace,
			});
			let HostResponse::Restored { content, title, .. } = response.map_err(user_error)? else {
				bail!("unexpected response to restore");
			};
			std::fs::write(&path, &content)
				.with_context(|| format!("failed to write {}", path.display()))?;
			info!(path = %path.display(), %title, "restored");
			let (file, content) = read_tracked(&path)?;
			report(history.handle(HostCommand::Save { file, content }))
		}
		Command::Rename { file, index, label } => report(history.handle(HostCommand::Rename {
			file: file_id(&file)?,
			index,
			label,
		})),
		Command::Cleanup { days } => report(history.handle(HostCommand::Cleanup { days })),
		Command::Retain { max } => report(history.handle(HostCommand::ConfigChanged {
			max_revisions: max,
		})),
		Command::Files => report(history.handle(HostCommand::ListFiles)),
		Command::Check => {
			let response = history.handle(HostCommand::Verify).map_err(user_error)?;
			let failed = matches!(&response, HostResponse::Verified(entries) if !entries.is_empty());
			print_response(response);
			if failed {
				bail!("damaged histories found");
			}
			Ok(())
		}
	}
}

fn report(response: Result<HostResponse, HostError>) -> anyhow::Result<()> {
	print_response(response.map_err(user_error)?);
	Ok(())
}

fn user_error(err: HostError) -> anyhow::Error {
	let message = err.user_message();
	anyhow::Error::new(err).context(message)
}

fn print_response(response: HostResponse) {
	match response {
		HostResponse::Recorded(outcome) => println!("{}", render::outcome(outcome)),
		HostResponse::Skipped { message } | HostResponse::Nothing { message } => {
			eprintln!("{message}");
		}
		HostResponse::Retained(report) => println!("{}", render::retention(&report)),
		HostResponse::CleanedUp(report) => println!("{}", render::cleanup(&report)),
		HostResponse::History(view) => print!("{}", render::history(&view, SystemClock.now_ms())),
		HostResponse::Comparison { unified_diff, .. } => print!("{unified_diff}"),
		HostResponse::Restored { content, .. } => print!("{content}"),
		HostResponse::Renamed => println!("renamed"),
		HostResponse::Files(files) => {
			for file in files {
				println!("{file}");
			}
		}
		HostResponse::Verified(entries) => println!("{}", render::corrupt(&entries)),
	}
}

/// Returns the identity used as the history key for `path`.
fn file_id(path: &Path) -> anyhow::Result<String> {
	let absolute = match std::fs::canonicalize(path) {
		Ok(path) => path,
		Err(_) => std::path::absolute(path)
			.with_context(|| format!("cannot resolve {}", path.display()))?,
	};
	Ok(absolute.to_string_lossy().into_owned())
}

fn read_tracked(path: &Path) -> anyhow::Result<(String, String)> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read {}", path.display()))?;
	Ok((file_id(path)?, content))
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn args_are_well_formed() {
		Args::command().debug_assert();
	}

	#[test]
	fn negative_index_addresses_base() {
		let args = Args::try_parse_from(["localhist", "show", "notes.txt", "-1"]).unwrap();
		assert!(matches!(args.command, Command::Show { index: -1, .. }));
	}

	#[test]
	fn store_flag_overrides_settings() {
		let config = std::env::temp_dir().join("localhist-cli-test-absent.toml");
		let args = Args::try_parse_from([
			"localhist",
			"--config",
			config.to_str().unwrap(),
			"--store",
			"/tmp/h.json",
			"files",
		])
		.unwrap();
		let settings = load_settings(&args).unwrap();
		assert_eq!(settings.store_path, Some(PathBuf::from("/tmp/h.json")));
		assert_eq!(settings.max_revisions_per_file, 50);
	}
}
