//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `socialgraph_core` linkage.
//! - Print per-kind edge counts for a database when one is configured.
//! - Start rolling file logs when `SOCIALGRAPH_LOG_DIR` is set.
//!
//! Usage: `socialgraph_cli [DB_PATH]`. Without an argument the path comes
//! from `SOCIALGRAPH_DB_PATH`; with neither, an empty in-memory graph is used.

use socialgraph_core::{init_logging, GraphConfig, GraphSession, OpenAccountDirectory};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("socialgraph_core ping={}", socialgraph_core::ping());
    println!("socialgraph_core version={}", socialgraph_core::core_version());

    let mut config = match GraphConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }
    if let Some(path) = std::env::args_os().nth(1) {
        config.db_path = Some(PathBuf::from(path));
    }

    let target = config
        .db_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());

    let session = match GraphSession::open(config, OpenAccountDirectory) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("failed to open {target}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let counts = session
        .relationships()
        .and_then(|relationships| relationships.edge_counts());
    match counts {
        Ok(counts) => {
            println!("db={target}");
            for (kind, count) in counts {
                println!("edges kind={kind} count={count}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to read graph statistics: {err}");
            ExitCode::FAILURE
        }
    }
}
