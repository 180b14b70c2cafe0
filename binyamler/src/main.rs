//! Yamler command-line tool for checking and transcoding YAML-superset documents.
//!
//! Usage: yamler [OPTIONS] [FILE]
//!
//! Reads FILE (or stdin when omitted or `-`), parses every document in it,
//! and writes JSON, YAML, TOML or CBOR. A single document is written as
//! itself; several are written as a list unless `--first` is given.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use libyamler::{parse_with_config, to_json_string, Config, Documents, Value};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod transcode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
    Toml,
    Cbor,
}

#[derive(Parser, Debug)]
#[command(name = "yamler", version)]
#[command(about = "Check and transcode YAML-superset documents")]
struct Args {
    /// Input file (reads stdin when omitted or `-`)
    file: Option<PathBuf>,

    /// Write output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    to: Format,

    /// JSON indent width; negative for compact output
    #[arg(
        short,
        long,
        env = "YAMLER_INDENT",
        default_value_t = 2,
        allow_negative_numbers = true
    )]
    indent: i32,

    /// Emit only the first document
    #[arg(long)]
    first: bool,

    /// Only check that the input parses (exit 0 if valid, 1 if invalid)
    #[arg(long)]
    check: bool,

    /// Define a variable for substitution (repeatable)
    #[arg(short = 'D', long = "var", value_name = "NAME=VALUE", value_parser = parse_define)]
    vars: Vec<(String, String)>,

    /// Resolve variables from the process environment
    #[arg(long)]
    env_vars: bool,

    /// Variable syntax, with `var` where the name goes
    #[arg(long, value_name = "TEMPLATE")]
    variable_syntax: Option<String>,

    /// Treat a colon in an unquoted key as a key/value separator
    #[arg(long)]
    strict_keys: bool,

    /// Log parser activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_define(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", arg)),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("YAMLER_LOG").unwrap_or_else(|_| default.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Build the parser configuration from the command-line flags.
fn config(args: &Args) -> Result<Config> {
    let mut config = Config::default().disallow_colons_in_unquoted_keys(args.strict_keys);
    if let Some(syntax) = &args.variable_syntax {
        config = config
            .with_variable_syntax(syntax.as_str())
            .with_context(|| format!("Invalid variable syntax: {}", syntax))?;
    }
    let defines: HashMap<String, String> = args.vars.iter().cloned().collect();
    if args.env_vars {
        config = config.with_variable_getter(move |name| {
            defines
                .get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
                .unwrap_or_else(|| "?".to_string())
        });
    } else if !defines.is_empty() {
        config = config.with_variables(defines);
    }
    Ok(config)
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display())),
        _ => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Cannot read stdin")?;
            Ok(input)
        }
    }
}

/// The value to emit: the first document, or all of them collapsed.
fn select(documents: Documents, first: bool) -> Value {
    if first {
        documents.first().cloned().unwrap_or_default()
    } else {
        documents.into_value()
    }
}

fn render(value: &Value, format: Format, indent: i32) -> Result<Vec<u8>> {
    let text = match format {
        Format::Json => {
            let mut json = to_json_string(value, indent);
            json.push('\n');
            json
        }
        Format::Yaml => transcode::yaml::encode(value)?,
        Format::Toml => transcode::toml::encode(value)?,
        Format::Cbor => return transcode::cbor::encode(value),
    };
    Ok(text.into_bytes())
}

fn run(args: &Args) -> Result<()> {
    let config = config(args)?;
    let input = read_input(args.file.as_ref())?;
    let documents = parse_with_config(&input, &config)?;
    debug!(documents = documents.len(), "parsed input");

    if args.check {
        return Ok(());
    }
    if args.first && documents.is_empty() {
        bail!("Input has no documents");
    }

    let value = select(documents, args.first);
    let output = render(&value, args.to, args.indent)?;
    match &args.output {
        Some(path) => fs::write(path, &output)
            .with_context(|| format!("Cannot write {}", path.display()))?,
        None => io::stdout()
            .write_all(&output)
            .context("Cannot write stdout")?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("yamler").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let args = args(&["-t", "yaml", "-i", "-1", "--first", "-D", "a=b", "in.yaml"]);
        assert_eq!(args.to, Format::Yaml);
        assert_eq!(args.indent, -1);
        assert!(args.first);
        assert_eq!(args.vars, vec![("a".to_string(), "b".to_string())]);
        assert_eq!(args.file, Some(PathBuf::from("in.yaml")));
    }

    #[test]
    fn rejects_bad_define() {
        assert!(parse_define("novalue").is_err());
        assert!(parse_define("=x").is_err());
        assert_eq!(parse_define("k=v=w").unwrap(), ("k".into(), "v=w".into()));
    }

    #[test]
    fn defines_feed_substitution() {
        let config = config(&args(&["-D", "name=world"])).unwrap();
        let docs = parse_with_config("greeting: hello ${name}", &config).unwrap();
        assert_eq!(
            to_json_string(&docs, -1),
            r#"{"greeting":"hello world"}"#
        );
    }

    #[test]
    fn custom_variable_syntax() {
        let config = config(&args(&["--variable-syntax", "%var%", "-D", "x=1"])).unwrap();
        let docs = parse_with_config("v: a%x%b", &config).unwrap();
        assert_eq!(to_json_string(&docs, -1), r#"{"v":"a1b"}"#);
    }

    #[test]
    fn select_first_or_all() {
        let docs = parse_with_config("--- 1\n--- 2\n", &Config::default()).unwrap();
        assert_eq!(select(docs.clone(), true), Value::from(1));
        assert_eq!(select(docs, false), Value::list([1, 2]));
    }

    #[test]
    fn renders_json_with_newline() {
        let value = Value::list([1, 2]);
        assert_eq!(render(&value, Format::Json, -1).unwrap(), b"[1,2]\n".to_vec());
        assert_eq!(render(&value, Format::Json, 2).unwrap(), b"[ 1, 2 ]\n".to_vec());
    }
}
