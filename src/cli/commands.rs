//! Built-in commands and dispatch
//!
//! argspec parses its own command line with the grammar engine: the root
//! grammar is a dispatcher that binds the global options and `<command>`,
//! and hands everything after the command name to that command's grammar.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{validators, ApplicationError, CommandSet};
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::grammar::{option, positional, Element, GrammarResult, Spec, Validator};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::InfraError;
use crate::parser::{Bound, ParseResult};
use crate::usage::render_usage;

pub const PROGRAM: &str = "argspec";

/// Built-in commands with their one-line descriptions.
pub const BUILTINS: &[(&str, &str)] = &[
    ("list", "List the user-defined commands with their usage"),
    ("usage", "Show the usage of a built-in or user-defined command"),
    ("check", "Parse arguments against a user-defined command"),
    ("help", "Show this help"),
];

/// Global options and the dispatched command, as parsed from argv.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub debug: usize,
    pub width: Option<usize>,
    pub file: Option<PathBuf>,
    pub command: String,
    pub arguments: Vec<String>,
}

/// `[-d|--debug]... [-w|--width <columns>] [-f|--file <path>] <command>`
pub fn root_spec() -> CliResult<Spec> {
    let builtins: Vec<String> = BUILTINS.iter().map(|(name, _)| name.to_string()).collect();
    let spec = Spec::new(
        false,
        [
            option("-d", "--debug").optional().repeatable(),
            option("-w", "--width")
                .optional()
                .parameter(positional("<columns>").validator(validators::positive_integer)),
            option("-f", "--file").optional().parameter(positional("<path>")),
            positional("<command>").with_validator(one_of(builtins)),
        ],
    );
    builtin(PROGRAM, spec)
}

/// Grammar of one built-in command; `commands` feeds the `<command>` validators.
pub fn builtin_spec(name: &str, commands: &CommandSet) -> CliResult<Spec> {
    let spec = match name {
        "usage" => {
            let mut known: Vec<String> = BUILTINS.iter().map(|(n, _)| n.to_string()).collect();
            known.extend(commands.names());
            Spec::new(true, [positional("<command>").with_validator(one_of(known))])
        }
        // a dispatcher: everything after <command> belongs to that command
        "check" => Spec::new(
            false,
            [
                positional("<command>").with_validator(one_of(commands.names())),
                positional("<argument>").optional().repeatable(),
            ],
        ),
        _ => Spec::new(true, Vec::<Element>::new()),
    };
    builtin(&qualified(name), spec)
}

fn builtin(command: &str, spec: GrammarResult<Spec>) -> CliResult<Spec> {
    spec.map_err(|e| ApplicationError::grammar(command, e).into())
}

fn one_of(names: Vec<String>) -> Validator {
    let names = Arc::new(names);
    Arc::new(move |value: &str| {
        if names.iter().any(|name| name == value) {
            Ok(())
        } else {
            Err(format!("Unknown command \"{value}\"."))
        }
    })
}

fn qualified(name: &str) -> String {
    format!("{PROGRAM} {name}")
}

impl Invocation {
    /// Parse argv (without the program name) against the root grammar.
    #[instrument(level = "debug", skip_all)]
    pub fn parse<I, S>(args: I) -> CliResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = root_spec()?;
        let result = spec
            .parse(args)
            .map_err(|error| CliError::usage(PROGRAM, error))?;

        // <columns> already passed positive_integer, which bounds it to usize
        let width = result.get_value("<columns>").and_then(|value| value.parse().ok());

        let invocation = Self {
            debug: result.count("--debug"),
            width,
            file: result.get_value("<path>").map(PathBuf::from),
            command: result.get_value("<command>").unwrap_or_default().to_string(),
            arguments: result.trailing().to_vec(),
        };
        debug!(?invocation, "parsed invocation");
        Ok(invocation)
    }
}

/// Parse argv and run the selected built-in command, writing its output to `out`.
pub fn run<I, S>(
    args: I,
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    out: &mut dyn Write,
) -> CliResult<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let invocation = Invocation::parse(args)?;
    run_invocation(&invocation, settings, fs, out)
}

/// Apply the command-line overrides to `settings` and execute.
pub fn run_invocation(
    invocation: &Invocation,
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    out: &mut dyn Write,
) -> CliResult<()> {
    let settings = settings.with_overrides(invocation.width, invocation.file.clone())?;
    let container =
        ServiceContainer::with_deps(settings, fs).with_explicit_commands_file(invocation.file.is_some());
    execute_command(invocation, &container, out)
}

pub fn execute_command(
    invocation: &Invocation,
    container: &ServiceContainer,
    out: &mut dyn Write,
) -> CliResult<()> {
    let commands = container.commands()?;
    let spec = builtin_spec(&invocation.command, &commands)?;
    let args = spec
        .parse(&invocation.arguments)
        .map_err(|error| CliError::usage(qualified(&invocation.command), error))?;
    let width = container.settings.output_width;

    let text = match invocation.command.as_str() {
        "list" => _list(&commands, container, width),
        "usage" => _usage(&args, &commands, width)?,
        "check" => _check(&args, &commands)?,
        _ => _help(&commands, width)?,
    };
    out.write_all(text.as_bytes())
        .map_err(|e| InfraError::io("write output", e))?;
    Ok(())
}

#[instrument(skip_all)]
fn _list(commands: &CommandSet, container: &ServiceContainer, width: usize) -> String {
    if commands.is_empty() {
        return format!(
            "No commands defined in {}\n",
            container.settings.commands_file.display()
        );
    }
    let mut text = String::new();
    for (i, command) in commands.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        if command.about().is_empty() {
            text.push_str(&format!("{}\n", command.name()));
        } else {
            text.push_str(&format!("{}: {}\n", command.name(), command.about()));
        }
        let name = qualified(&format!("check {}", command.name()));
        text.push_str(&render_usage(command.spec(), &name, width));
        text.push('\n');
    }
    text
}

#[instrument(skip_all)]
fn _usage(args: &ParseResult, commands: &CommandSet, width: usize) -> CliResult<String> {
    let name = args.get_value("<command>").unwrap_or_default();
    debug!("name: {:?}", name);
    let block = match commands.get(name) {
        Some(command) => render_usage(command.spec(), &qualified(&format!("check {name}")), width),
        None => render_usage(&builtin_spec(name, commands)?, &qualified(name), width),
    };
    Ok(format!("{block}\n"))
}

/// Parse the trailing arguments against a user-defined command and print the
/// bindings as an indented tree.
#[instrument(skip_all)]
fn _check(args: &ParseResult, commands: &CommandSet) -> CliResult<String> {
    let name = args.get_value("<command>").unwrap_or_default();
    let Some(command) = commands.get(name) else {
        return Err(ApplicationError::InvalidDefinition {
            command: name.to_string(),
            message: "not defined".to_string(),
        }
        .into());
    };
    let result = command
        .spec()
        .parse(args.trailing())
        .map_err(|error| CliError::usage(qualified(&format!("check {name}")), error))?;
    if result.is_empty() {
        return Ok("(no arguments bound)\n".to_string());
    }
    let mut text = String::new();
    format_bindings(&result, 0, &mut text);
    Ok(text)
}

fn format_bindings(result: &ParseResult, depth: usize, text: &mut String) {
    let indent = "  ".repeat(depth);
    for binding in result.bindings() {
        match binding.bound() {
            Bound::Values(values) => {
                for value in values {
                    text.push_str(&format!("{indent}{} = {value}\n", binding.label()));
                }
            }
            Bound::Occurrences(subsets) => {
                for subset in subsets {
                    text.push_str(&format!("{indent}{}\n", binding.label()));
                    format_bindings(subset, depth + 1, text);
                }
            }
        }
    }
}

#[instrument(skip_all)]
fn _help(commands: &CommandSet, width: usize) -> CliResult<String> {
    let mut text = render_usage(&root_spec()?, PROGRAM, width);
    text.push_str("\n\nCommands:\n");
    for (name, about) in BUILTINS {
        text.push_str(&format!("  {name:<8}{about}\n"));
    }
    if !commands.is_empty() {
        text.push_str("\nUser-defined commands (run with `check <command>`):\n");
        for command in commands.iter() {
            text.push_str(&format!("  {:<8}{}\n", command.name(), command.about()));
        }
    }
    Ok(text)
}
