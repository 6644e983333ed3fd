//! pstore — command-line front end for the parameter store.
//!
//! Loads a snapshot file into a fresh store, runs one command, and writes
//! the snapshot back when the command changed it.
//!
//! # Usage
//!
//! ```text
//! pstore get sep
//! pstore set win.loc +20+40
//! pstore set data/pts '[1,2,3]' --attr source
//! pstore clear --data
//! pstore --file session.yaml dump
//! ```

mod args;
mod snapshot_file;

use std::path::PathBuf;
use std::process;

use paramstore_core::config;
use paramstore_core::namespace::{Call, Defaults, ParameterStore, Response};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{parse_args, CliArgs, CliCommand, USAGE};


fn main() {
    init_logging();

    let raw: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = raw[1..].iter().map(|s| s.as_str()).collect();

    let args = match parse_args(&arg_refs) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("pstore: {}", e);
            process::exit(1);
        }
    };

    match run(args) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(message) => {
            eprintln!("pstore error: {}", message);
            process::exit(1);
        }
    }
}


fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}


fn resolve_snapshot_file() -> PathBuf {
    if let Ok(file) = std::env::var("PSTORE_FILE") {
        return PathBuf::from(file);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home)
        .join(".config")
        .join("paramstore")
        .join("session.json")
}


/// Execute one parsed command line and return what to print.
fn run(args: CliArgs) -> Result<String, String> {
    if args.command == CliCommand::Help {
        return Ok(USAGE.to_string());
    }

    let store_config = match &args.config {
        Some(path) => config::load(path).map_err(|e| e.to_string())?,
        None => config::default_config(),
    };
    let file = args.file.clone().unwrap_or_else(resolve_snapshot_file);
    debug!(file = %file.display(), "loading snapshot");

    let mut store = ParameterStore::with_config(Defaults::standard(), store_config);
    store.restore_all(snapshot_file::load(&file)?);

    let output = execute(&mut store, &args.command)?;

    if args.command.mutates() {
        snapshot_file::save(&file, &store.snapshot())?;
    }
    Ok(output)
}


fn execute(store: &mut ParameterStore, command: &CliCommand) -> Result<String, String> {
    let call = match command {
        CliCommand::Help => return Ok(USAGE.to_string()),
        CliCommand::Defaults => {
            return Ok(store.defaults().keys().collect::<Vec<_>>().join("\n"));
        }
        CliCommand::Dump => Call::new(),
        CliCommand::Get { path, attr } => {
            let call = Call::new().path(path.clone());
            match attr {
                Some(name) => call.which_attr(name.clone()),
                None => call,
            }
        }
        CliCommand::Set { path, value, attr } => {
            let call = Call::new().path(path.clone()).value(value.clone());
            match attr {
                Some(name) => call.which_attr(name.clone()),
                None => call,
            }
        }
        CliCommand::Clear { data, project } => Call {
            clear_data: *data,
            clear_proj: *project,
            ..Call::default()
        },
        CliCommand::Reset => Call::new().replace_all(Default::default()),
    };

    let response = store
        .execute(call.into_request())
        .map_err(|e| e.to_string())?;
    render(response)
}


fn render(response: Response) -> Result<String, String> {
    let json = match response {
        Response::Done => return Ok(String::new()),
        Response::Snapshot(snapshot) => serde_json::Value::Object(
            snapshot
                .as_table()
                .iter()
                .map(|(k, p)| (k.clone(), p.to_json()))
                .collect(),
        ),
        Response::Value(value) | Response::Attr(value) => {
            value.map(|p| p.to_json()).unwrap_or_default()
        }
    };
    serde_json::to_string_pretty(&json).map_err(|e| e.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_line(file: &std::path::Path, line: &[&str]) -> Result<String, String> {
        let file_str = file.to_str().unwrap();
        let mut full = vec!["--file", file_str];
        full.extend_from_slice(line);
        run(parse_args(&full)?)
    }

    #[test]
    fn resolve_snapshot_file_from_env() {
        std::env::set_var("PSTORE_FILE", "/tmp/pstore-test.json");
        assert_eq!(resolve_snapshot_file(), PathBuf::from("/tmp/pstore-test.json"));
        std::env::remove_var("PSTORE_FILE");
    }

    #[test]
    fn set_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");

        run_line(&file, &["set", "sep", "\",\""]).unwrap();
        run_line(&file, &["set", "sep", "csv", "--attr", "origin"]).unwrap();

        assert_eq!(run_line(&file, &["get", "sep"]).unwrap(), "\",\"");
        assert_eq!(
            run_line(&file, &["get", "sep", "--attr", "origin"]).unwrap(),
            "\"csv\""
        );
    }

    #[test]
    fn get_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        assert_eq!(run_line(&file, &["get", "nlevels"]).unwrap(), "20");
        assert_eq!(run_line(&file, &["get", "unknown"]).unwrap(), "null");
        assert_eq!(
            run_line(&file, &["get", "sep", "--attr", "origin"]).unwrap(),
            "\"\\t\""
        );
        assert!(!file.exists());
    }

    #[test]
    fn clear_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.yaml");
        run_line(&file, &["set", "win.loc", "+5+5"]).unwrap();
        run_line(&file, &["set", "pts", "[1,2]"]).unwrap();
        run_line(&file, &["clear", "--project"]).unwrap();

        let dumped: serde_json::Value =
            serde_json::from_str(&run_line(&file, &["dump"]).unwrap()).unwrap();
        assert_eq!(dumped, json!({"win.loc": "+5+5"}));

        run_line(&file, &["reset"]).unwrap();
        assert_eq!(run_line(&file, &["dump"]).unwrap(), "{}");
    }

    #[test]
    fn defaults_listed() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_line(&dir.path().join("s.json"), &["defaults"]).unwrap();
        assert!(out.lines().any(|l| l == "palette.grd"));
    }
}
