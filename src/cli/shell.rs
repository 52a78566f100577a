//! Line-oriented shell: the presentation layer of the editor.
//!
//! Each line is one user intent. Ids may be abbreviated to any unique
//! prefix; the rendered tree shows the first eight characters.

use std::io::BufRead;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{Command, Outcome, QuerySession};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{render_json, render_tree};
use crate::domain::{Combinator, ConditionPatch, DomainError, Operator};

pub const HELP: &str = "\
toggle <group> [AND|OR]              set or flip a group's combinator
add-rule <group>                     append a default condition
add-group <group>                    append a nested group
edit <group> <rule> field <key>      change a condition's field
edit <group> <rule> operator <op>    change a condition's operator
edit <group> <rule> value <text>     change a condition's value
rm-rule <group> <rule>               remove a condition
rm-group <parent> <group>            remove a nested group
show | json | fields | operators | help | quit";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Edit(Command),
    Show,
    Json,
    Fields,
    Operators,
    Help,
    Quit,
    /// Blank line or `#` comment
    Nothing,
}

/// Split off up to `n` whitespace-separated words; the remainder is trimmed.
fn take_words(line: &str, n: usize) -> (Vec<&str>, &str) {
    let mut rest = line;
    let mut words = Vec::with_capacity(n);
    for _ in 0..n {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        words.push(&rest[..end]);
        rest = &rest[end..];
    }
    (words, rest.trim())
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn expect_args<'a>(verb: &str, words: &[&'a str], n: usize) -> CliResult<Vec<&'a str>> {
    if words.len() < n {
        return Err(CliError::Usage(format!(
            "{} needs {} argument(s), see 'help'",
            verb, n
        )));
    }
    Ok(words[..n].to_vec())
}

/// Parse one line against the current session; ids are resolved to full ids
/// and enumerated values are checked here, before the editor sees them.
pub fn parse_line(line: &str, session: &QuerySession) -> CliResult<ShellInput> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(ShellInput::Nothing);
    }
    let (verb, rest) = take_words(line, 1);
    let verb = verb[0].to_ascii_lowercase();
    let id = |raw: &str| session.resolve_id(raw);

    let input = match verb.as_str() {
        "toggle" => {
            let (words, _) = take_words(rest, 2);
            let args = expect_args("toggle", &words, 1)?;
            let group = id(args[0]);
            let combinator = match words.get(1) {
                Some(value) => value.parse::<Combinator>()?,
                None => session
                    .root()
                    .find_group(&group)
                    .map(|g| g.combinator.toggled())
                    .unwrap_or_default(),
            };
            ShellInput::Edit(Command::Toggle { group, combinator })
        }
        "add-rule" => {
            let (words, _) = take_words(rest, 1);
            let args = expect_args("add-rule", &words, 1)?;
            ShellInput::Edit(Command::AddRule { group: id(args[0]) })
        }
        "add-group" => {
            let (words, _) = take_words(rest, 1);
            let args = expect_args("add-group", &words, 1)?;
            ShellInput::Edit(Command::AddGroup { group: id(args[0]) })
        }
        "edit" => {
            let (words, text) = take_words(rest, 3);
            let args = expect_args("edit", &words, 3)?;
            let patch = parse_patch(args[2], unquote(text), session)?;
            ShellInput::Edit(Command::EditRule {
                group: id(args[0]),
                rule: id(args[1]),
                patch,
            })
        }
        "rm-rule" => {
            let (words, _) = take_words(rest, 2);
            let args = expect_args("rm-rule", &words, 2)?;
            ShellInput::Edit(Command::RemoveRule {
                group: id(args[0]),
                rule: id(args[1]),
            })
        }
        "rm-group" => {
            let (words, _) = take_words(rest, 2);
            let args = expect_args("rm-group", &words, 2)?;
            ShellInput::Edit(Command::RemoveGroup {
                parent: id(args[0]),
                group: id(args[1]),
            })
        }
        "show" => ShellInput::Show,
        "json" => ShellInput::Json,
        "fields" => ShellInput::Fields,
        "operators" => ShellInput::Operators,
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" => ShellInput::Quit,
        other => return Err(CliError::Usage(format!("unknown command '{}', see 'help'", other))),
    };
    Ok(input)
}

fn parse_patch(attribute: &str, text: &str, session: &QuerySession) -> CliResult<ConditionPatch> {
    let patch = match attribute.to_ascii_lowercase().as_str() {
        "field" => {
            if session.catalog().get(text).is_none() {
                return Err(DomainError::UnknownField(text.to_string()).into());
            }
            ConditionPatch::field(text)
        }
        "operator" => ConditionPatch::operator(text.parse::<Operator>()?),
        "value" => ConditionPatch::value(text),
        other => return Err(DomainError::UnknownAttribute(other.to_string()).into()),
    };
    Ok(patch)
}

pub fn print_tree(session: &QuerySession) {
    output::info(render_tree(session.root(), session.catalog()).trim_end());
}

pub fn print_fields(session: &QuerySession) {
    output::header("Fields");
    for field in session.catalog().iter() {
        output::detail(&format!(
            "{:<14} {:<14} {:<7} {}",
            field.key,
            field.label,
            field.kind.as_str(),
            field.placeholder_or_default()
        ));
    }
}

pub fn print_operators() {
    output::header("Operators");
    for operator in Operator::ALL {
        output::detail(&format!("{:<14} {}", operator.key(), operator.label()));
    }
    output::header("Combinators");
    output::detail(&Combinator::ALL.iter().join(" | "));
}

fn report(outcome: &Outcome, command: &Command) {
    match outcome {
        Outcome::Applied { created: Some(id) } => output::success(&format!("added {}", id.short())),
        Outcome::Applied { created: None } => output::success("updated"),
        Outcome::Ignored => output::skipped(&format!(
            "nothing matched under group {}, tree unchanged",
            command.target()
        )),
    }
}

/// Interactive loop: one command per line, tree re-rendered after each edit.
/// Bad lines are reported and the loop goes on.
#[instrument(level = "debug", skip_all)]
pub fn run_interactive(session: &mut QuerySession, input: impl BufRead) -> CliResult<()> {
    print_tree(session);
    output::prompt(">");
    for line in input.lines() {
        let line = line.map_err(|e| CliError::io("read stdin", e))?;
        match parse_line(&line, session) {
            Ok(ShellInput::Quit) => break,
            Ok(parsed) => {
                if execute(session, parsed)? {
                    print_tree(session);
                }
            }
            Err(e) => output::error(&e),
        }
        output::prompt(">");
    }
    Ok(())
}

/// Script mode: the first bad line aborts with its line number.
#[instrument(level = "debug", skip_all)]
pub fn run_script(session: &mut QuerySession, input: impl BufRead) -> CliResult<()> {
    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(|e| CliError::io("read script", e))?;
        let parsed = parse_line(&line, session).map_err(|e| {
            CliError::InvalidArgs(format!("line {}: {}", index + 1, e))
        })?;
        if parsed == ShellInput::Quit {
            break;
        }
        execute(session, parsed)?;
    }
    debug!("script applied {} edit(s)", session.applied());
    Ok(())
}

/// Returns true when the tree changed and should be shown again.
fn execute(session: &mut QuerySession, input: ShellInput) -> CliResult<bool> {
    match input {
        ShellInput::Edit(command) => {
            let outcome = session.dispatch(command.clone());
            report(&outcome, &command);
            return Ok(outcome.is_applied());
        }
        ShellInput::Show => print_tree(session),
        ShellInput::Json => output::info(&render_json(session.root())?),
        ShellInput::Fields => print_fields(session),
        ShellInput::Operators => print_operators(),
        ShellInput::Help => output::info(HELP),
        ShellInput::Quit | ShellInput::Nothing => {}
    }
    Ok(false)
}
