//! `charcount`: replay a typing script against a countdown-enhanced textarea.
//!
//! ```text
//! charcount [--config FILE] [--maxlength N] [--value TEXT] [--legacy]
//!           [--type SCRIPT | --paste TEXT]...
//! ```
//!
//! In a `--type` script, `\b` is a backspace, `\n` a newline and `\\` a
//! backslash. Every step prints the counter; the final value and a DOM
//! snapshot follow.

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use countdown::{ConfigError, CountdownOptions, Document, DocumentError, HostProfile};
use html::{Id, Node};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const FIELD: Id = Id(3);

#[derive(Debug, Parser)]
#[command(
    name = "charcount",
    about = "Replay typing against a character-countdown textarea"
)]
struct Cli {
    /// TOML file with countdown options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// `maxlength` attribute of the textarea
    #[arg(long, value_name = "N")]
    maxlength: Option<String>,
    /// Starting text of the textarea
    #[arg(long, value_name = "TEXT", default_value = "")]
    value: String,
    /// Simulate a host without numeric selection offsets
    #[arg(long)]
    legacy: bool,
    /// Type a script key by key: `\b` backspace, `\n` newline, `\\` backslash
    #[arg(long = "type", value_name = "SCRIPT", allow_hyphen_values = true)]
    typed: Vec<String>,
    /// Paste text at the caret in one go
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    paste: Vec<String>,
}

#[derive(Debug)]
enum CliError {
    Io { path: PathBuf, source: std::io::Error },
    Config(ConfigError),
    Document(DocumentError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Config(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            Self::Document(err) => Some(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<DocumentError> for CliError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Step {
    Type(String),
    Paste(String),
}

/// `--type` and `--paste` steps in command-line order.
fn steps(cli: &Cli, matches: &ArgMatches) -> Vec<Step> {
    let typed = matches.indices_of("typed").into_iter().flatten();
    let pasted = matches.indices_of("paste").into_iter().flatten();
    let mut steps: Vec<(usize, Step)> = typed
        .zip(cli.typed.iter().cloned().map(Step::Type))
        .chain(pasted.zip(cli.paste.iter().cloned().map(Step::Paste)))
        .collect();
    steps.sort_by_key(|(index, _)| *index);
    steps.into_iter().map(|(_, step)| step).collect()
}

fn parse_args<I, T>(args: I) -> Result<(Cli, Vec<Step>), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    let steps = steps(&cli, &matches);
    Ok((cli, steps))
}

/// One keystroke of a `--type` script.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Key {
    Text(String),
    Backspace,
}

fn keys(script: &str) -> Vec<Key> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut chars = script.chars();
    while let Some(ch) = chars.next() {
        let typed = match ch {
            '\\' => match chars.next() {
                Some('b') => {
                    if !pending.is_empty() {
                        out.push(Key::Text(std::mem::take(&mut pending)));
                    }
                    out.push(Key::Backspace);
                    continue;
                }
                Some('n') => '\n',
                Some(other) => other,
                None => '\\',
            },
            other => other,
        };
        pending.push(typed);
    }
    if !pending.is_empty() {
        out.push(Key::Text(pending));
    }
    out
}

fn page(cli: &Cli) -> Node {
    let mut attributes = vec![(Arc::from("id"), Some("message".to_string()))];
    if let Some(max) = &cli.maxlength {
        attributes.push((Arc::from("maxlength"), Some(max.clone())));
    }
    Node::Document {
        id: Id(1),
        doctype: Some("html".to_string()),
        children: vec![Node::Element {
            id: Id(2),
            name: Arc::from("form"),
            attributes: Vec::new(),
            children: vec![Node::Element {
                id: FIELD,
                name: Arc::from("textarea"),
                attributes,
                children: vec![Node::Text {
                    id: Id(4),
                    text: cli.value.clone(),
                }],
            }],
        }],
    }
}

fn load_options(path: Option<&Path>) -> Result<CountdownOptions, CliError> {
    let Some(path) = path else {
        return Ok(CountdownOptions::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(CountdownOptions::from_toml_str(&text)?)
}

fn report(doc: &Document, what: &str) {
    println!(
        "{what:<24} {}",
        doc.counter_text(FIELD)
            .unwrap_or_else(|| "(no counter)".to_string())
    );
}

fn run(cli: &Cli, steps: &[Step]) -> Result<(), CliError> {
    let options = load_options(cli.config.as_deref())?;
    let profile = if cli.legacy {
        HostProfile::legacy()
    } else {
        HostProfile::modern()
    };

    let mut doc = Document::with_profile(profile);
    doc.load(&page(cli))?;
    doc.attach(FIELD, options)?;
    report(&doc, "attached");

    for step in steps {
        match step {
            Step::Type(script) => {
                for key in keys(script) {
                    match key {
                        Key::Text(text) => doc.type_text(FIELD, &text)?,
                        Key::Backspace => doc.backspace(FIELD)?,
                    }
                }
                report(&doc, &format!("type {script:?}"));
            }
            Step::Paste(text) => {
                doc.paste(FIELD, text)?;
                report(&doc, &format!("paste {text:?}"));
            }
        }
    }

    println!();
    println!("value: {:?}", doc.value(FIELD).unwrap_or_default());
    println!("caret: {}", doc.caret(FIELD).unwrap_or_default());
    println!();
    println!("{}", doc.snapshot()?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let (cli, steps) = match parse_args(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    };
    match run(&cli, &steps) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!(target: "charcount", "{err:?}");
            eprintln!("charcount: {err}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<(Cli, Vec<Step>), clap::Error> {
        parse_args(std::iter::once("charcount").chain(list.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn steps_keep_command_line_order() {
        let (cli, steps) = parse(&[
            "--value", "hi", "--type", "abc", "--paste", "xyz", "--type", "d", "--legacy",
        ])
        .unwrap();
        assert_eq!(cli.value, "hi");
        assert!(cli.legacy);
        assert_eq!(
            steps,
            vec![
                Step::Type("abc".into()),
                Step::Paste("xyz".into()),
                Step::Type("d".into()),
            ]
        );
    }

    #[test]
    fn scripts_may_start_with_a_hyphen() {
        let (_, steps) = parse(&["--paste", "-x-", "--type", "-ab"]).unwrap();
        assert_eq!(steps, vec![Step::Paste("-x-".into()), Step::Type("-ab".into())]);
    }

    #[test]
    fn rejects_unknown_and_incomplete_arguments() {
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--type"]).is_err());
    }

    #[test]
    fn script_escapes() {
        assert_eq!(
            keys(r"ab\bc\nd\\"),
            vec![
                Key::Text("ab".into()),
                Key::Backspace,
                Key::Text("c\nd\\".into()),
            ]
        );
    }

    #[test]
    fn replays_against_the_page() {
        let (cli, steps) = parse(&["--maxlength", "4", "--type", "abcdef"]).unwrap();
        assert_eq!(steps, vec![Step::Type("abcdef".into())]);

        let mut doc = Document::new();
        doc.load(&page(&cli)).unwrap();
        doc.attach(FIELD, CountdownOptions::default()).unwrap();
        doc.type_text(FIELD, "abcdef").unwrap();
        assert_eq!(doc.value(FIELD), Some("abcd"));
        assert_eq!(
            doc.counter_text(FIELD).as_deref(),
            Some("Characters remaining: 0")
        );
    }
}
