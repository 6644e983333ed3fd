use std::path::PathBuf;

use paramstore_core::namespace::KeyPath;
use serde_json::Value;


/// Parsed command line: global options plus one command.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub command: CliCommand,
}


#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Dump,
    Get {
        path: KeyPath,
        attr: Option<String>,
    },
    Set {
        path: KeyPath,
        value: Value,
        attr: Option<String>,
    },
    Clear {
        data: bool,
        project: bool,
    },
    Reset,
    Defaults,
    Help,
}

impl CliCommand {
    /// True if the command changes the snapshot and it must be written back.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            CliCommand::Set { .. } | CliCommand::Clear { .. } | CliCommand::Reset
        )
    }
}


pub const USAGE: &str = "\
Usage: pstore [--file <snapshot>] [--config <yaml>] <command>

Commands:
  dump                              print the whole store as JSON
  get <path> [--attr <name>]        print a value (or attribute)
  set <path> <json> [--attr <name>] set a value (or attribute)
  clear --data | --project          drop runtime data or reset the project
  reset                             empty the store
  defaults                          list schema default keys
  help                              show this message

Paths: segments separated by '/', positions as [n], e.g. vars/x[2].
  A backslash escapes '/', '[', ']' or '\\' inside a name: in\\/out

Snapshot file (JSON, or YAML for .yaml/.yml): one entry per key,
  {\"sep\": {\"value\": \",\"}, \"grid\": {\"value\": {\"nx\": {\"value\": 10}}, \"attrs\": {\"units\": \"m\"}}}
  A table's value is an object of entries; plain JSON objects are also accepted.";


/// Parse CLI arguments, without the program name.
pub fn parse_args(args: &[&str]) -> Result<CliArgs, String> {
    let mut file = None;
    let mut config = None;
    let mut rest = args;

    loop {
        match rest {
            ["--file", value, tail @ ..] => {
                file = Some(PathBuf::from(value));
                rest = tail;
            }
            ["--config", value, tail @ ..] => {
                config = Some(PathBuf::from(value));
                rest = tail;
            }
            ["--file" | "--config"] => {
                return Err(format!("{} requires a value", rest[0]));
            }
            _ => break,
        }
    }

    let command = parse_command(rest)?;
    Ok(CliArgs {
        file,
        config,
        command,
    })
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

fn parse_command(args: &[&str]) -> Result<CliCommand, String> {
    let Some((&name, rest)) = args.split_first() else {
        return Err("No command specified. Run 'pstore help' for usage.".into());
    };

    match name {
        "dump" => no_extra(name, rest).map(|_| CliCommand::Dump),
        "get" => parse_get(rest),
        "set" => parse_set(rest),
        "clear" => parse_clear(rest),
        "reset" => no_extra(name, rest).map(|_| CliCommand::Reset),
        "defaults" => no_extra(name, rest).map(|_| CliCommand::Defaults),
        "help" | "--help" | "-h" => Ok(CliCommand::Help),
        _ => Err(format!("Unknown command: '{}'", name)),
    }
}

/// `pstore get <path> [--attr <name>]`
fn parse_get(args: &[&str]) -> Result<CliCommand, String> {
    let (positional, attr) = split_attr(args)?;
    match positional.as_slice() {
        [path] => Ok(CliCommand::Get {
            path: parse_path(path)?,
            attr,
        }),
        _ => Err("Usage: pstore get <path> [--attr <name>]".into()),
    }
}

/// `pstore set <path> <json> [--attr <name>]`
///
/// A value that is not valid JSON is taken as a plain string.
fn parse_set(args: &[&str]) -> Result<CliCommand, String> {
    let (positional, attr) = split_attr(args)?;
    match positional.as_slice() {
        [path, raw] => Ok(CliCommand::Set {
            path: parse_path(path)?,
            value: serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
            attr,
        }),
        _ => Err("Usage: pstore set <path> <json> [--attr <name>]".into()),
    }
}

/// `pstore clear --data | --project`
fn parse_clear(args: &[&str]) -> Result<CliCommand, String> {
    let mut data = false;
    let mut project = false;
    for arg in args {
        match *arg {
            "--data" => data = true,
            "--project" => project = true,
            other => return Err(format!("Unknown clear flag: '{}'", other)),
        }
    }
    if !data && !project {
        return Err("Usage: pstore clear --data | --project".into());
    }
    Ok(CliCommand::Clear { data, project })
}

fn split_attr<'a>(args: &[&'a str]) -> Result<(Vec<&'a str>, Option<String>), String> {
    let mut positional = Vec::new();
    let mut attr = None;
    let mut iter = args.iter();
    while let Some(&arg) = iter.next() {
        if arg == "--attr" {
            match iter.next() {
                Some(name) => attr = Some(name.to_string()),
                None => return Err("--attr requires a name".into()),
            }
        } else {
            positional.push(arg);
        }
    }
    Ok((positional, attr))
}

fn parse_path(text: &str) -> Result<KeyPath, String> {
    KeyPath::parse(text).map_err(|e| format!("bad path '{}': {}", text, e))
}

fn no_extra(name: &str, rest: &[&str]) -> Result<(), String> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(format!("'{}' takes no arguments", name))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_is_error() {
        assert!(parse_args(&[]).is_err());
    }

    #[test]
    fn global_options_then_command() {
        let args = parse_args(&["--file", "s.yaml", "--config", "c.yaml", "dump"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("s.yaml")));
        assert_eq!(args.config, Some(PathBuf::from("c.yaml")));
        assert_eq!(args.command, CliCommand::Dump);
    }

    #[test]
    fn dangling_option_is_error() {
        assert!(parse_args(&["--file"]).is_err());
    }

    #[test]
    fn get_with_attr() {
        let args = parse_args(&["get", "vars/x[2]", "--attr", "units"]).unwrap();
        assert_eq!(
            args.command,
            CliCommand::Get {
                path: KeyPath::parse("vars/x[2]").unwrap(),
                attr: Some("units".into()),
            }
        );
    }

    #[test]
    fn set_parses_json_or_string() {
        let args = parse_args(&["set", "nlevels", "30"]).unwrap();
        match args.command {
            CliCommand::Set { value, .. } => assert_eq!(value, json!(30)),
            other => panic!("expected Set, got {:?}", other),
        }
        let args = parse_args(&["set", "win.loc", "+10+10"]).unwrap();
        match args.command {
            CliCommand::Set { value, .. } => assert_eq!(value, json!("+10+10")),
            other => panic!("expected Set, got {:?}", other),
        }
    }

    #[test]
    fn clear_requires_flag() {
        assert!(parse_args(&["clear"]).is_err());
        assert!(parse_args(&["clear", "--all"]).is_err());
        assert_eq!(
            parse_args(&["clear", "--project"]).unwrap().command,
            CliCommand::Clear {
                data: false,
                project: true,
            }
        );
    }

    #[test]
    fn bad_path_reported() {
        let err = parse_args(&["get", "a//b"]).unwrap_err();
        assert!(err.contains("bad path"));
    }

    #[test]
    fn escaped_path_keeps_separator_in_name() {
        let args = parse_args(&["get", r"in\/out[1]"]).unwrap();
        assert_eq!(
            args.command,
            CliCommand::Get {
                path: KeyPath::single("in/out").child(1usize),
                attr: None,
            }
        );
    }

    #[test]
    fn usage_describes_snapshot_format() {
        assert!(USAGE.contains("Snapshot file"));
        assert!(USAGE.contains(r#"{"nx": {"value": 10}}"#));
    }

    #[test]
    fn mutating_commands() {
        assert!(CliCommand::Reset.mutates());
        assert!(!CliCommand::Dump.mutates());
    }
}
