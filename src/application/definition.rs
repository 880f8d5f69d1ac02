//! User-defined commands declared in TOML
//!
//! ```toml
//! [[command]]
//! name = "serve"
//! about = "Start the development server"
//!
//! [[command.argument]]
//! short = "-p"
//! long = "--port"
//! optional = true
//!
//! [[command.argument.parameter]]
//! positional = "<port>"
//! validate = "integer"
//! ```
//!
//! Every element goes through the grammar builder, so a definition file
//! can never produce a [`Spec`] that the builder API would reject.

use std::collections::HashSet;
use std::path::Path;

use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::validators;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::grammar::{long_option, option, positional, short_option, ElementBuilder, Spec};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandFile {
    #[serde(default, rename = "command")]
    commands: Vec<CommandDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandDef {
    name: String,
    #[serde(default)]
    about: String,
    #[serde(default, rename = "argument")]
    arguments: Vec<ElementDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ElementDef {
    positional: Option<String>,
    short: Option<String>,
    long: Option<String>,
    label: Option<String>,
    id: Option<String>,
    optional: bool,
    repeatable: bool,
    group: Option<String>,
    validate: Option<String>,
    parameter: Vec<ElementDef>,
}

impl ElementDef {
    fn into_builder(self, command: &str) -> ApplicationResult<ElementBuilder> {
        let mut builder = match (self.positional, self.short, self.long) {
            (Some(label), None, None) => positional(label),
            (None, Some(short), Some(long)) => option(&short, &long),
            (None, Some(short), None) => short_option(&short),
            (None, None, Some(long)) => long_option(&long),
            (Some(label), _, _) => {
                return Err(invalid(
                    command,
                    format!("argument \"{label}\" declares both a positional label and option names"),
                ))
            }
            (None, None, None) => {
                return Err(invalid(
                    command,
                    "argument declares neither a positional label nor option names",
                ))
            }
        };

        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if self.optional {
            builder = builder.optional();
        }
        if self.repeatable {
            builder = builder.repeatable();
        }
        if let Some(group) = self.group {
            builder = builder.exclusion_group(group);
        }
        if let Some(name) = self.validate {
            let validator = validators::by_name(&name).ok_or_else(|| {
                invalid(
                    command,
                    format!(
                        "unknown validator \"{name}\" (expected one of: {})",
                        validators::NAMES.iter().join(", ")
                    ),
                )
            })?;
            builder = builder.with_validator(validator);
        }
        for parameter in self.parameter {
            builder = builder.parameter(parameter.into_builder(command)?);
        }
        Ok(builder)
    }
}

fn invalid(command: &str, message: impl Into<String>) -> ApplicationError {
    ApplicationError::InvalidDefinition {
        command: command.to_string(),
        message: message.into(),
    }
}

/// A named, user-defined command and its grammar.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    about: String,
    spec: Spec,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }
}

/// User-defined commands in file order.
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: Vec<Command>,
}

impl CommandSet {
    pub fn from_toml_str(content: &str) -> ApplicationResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Load a commands file; a missing file is an error.
    #[instrument(level = "debug", skip(fs))]
    pub fn load(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Self> {
        if !fs.is_file(path) {
            return Err(ApplicationError::CommandFileNotFound(path.to_path_buf()));
        }
        let content = fs
            .read_to_string(path)
            .with_path_context("read commands file", path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Load the commands file at its default location; a missing file yields an empty set.
    #[instrument(level = "debug", skip(fs))]
    pub fn load_default(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Self> {
        if !fs.exists(path) {
            debug!("No commands file at {}", path.display());
            return Ok(Self::default());
        }
        Self::load(fs, path)
    }

    fn parse(content: &str, origin: &str) -> ApplicationResult<Self> {
        let file: CommandFile =
            toml::from_str(content).map_err(|e| ApplicationError::InvalidCommandFile {
                origin: origin.to_string(),
                message: e.to_string().trim_end().to_string(),
            })?;

        let mut seen = HashSet::new();
        let mut commands = Vec::with_capacity(file.commands.len());
        for def in file.commands {
            if def.name.is_empty()
                || def.name.starts_with('-')
                || def.name.chars().any(char::is_whitespace)
            {
                return Err(invalid(
                    &def.name,
                    "command names must be non-empty words not starting with '-'",
                ));
            }
            if !seen.insert(def.name.clone()) {
                return Err(ApplicationError::DuplicateCommand(def.name));
            }

            let arguments = def
                .arguments
                .into_iter()
                .map(|element| element.into_builder(&def.name))
                .collect::<ApplicationResult<Vec<_>>>()?;
            let spec =
                Spec::new(true, arguments).map_err(|e| ApplicationError::grammar(&def.name, e))?;
            debug!(command = %def.name, elements = spec.elements().len(), "Loaded command");

            commands.push(Command {
                name: def.name,
                about: def.about,
                spec,
            });
        }
        Ok(Self { commands })
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarError;
    use crate::parser::UsageErrorKind;

    const SERVE: &str = r#"
[[command]]
name = "serve"
about = "Start the development server"

[[command.argument]]
short = "-p"
long = "--port"
optional = true

[[command.argument.parameter]]
positional = "<port>"
validate = "integer"

[[command.argument]]
positional = "<address>"
"#;

    #[test]
    fn given_command_file_when_parsing_then_builds_spec() {
        let commands = CommandSet::from_toml_str(SERVE).expect("valid file");

        assert_eq!(commands.len(), 1);
        let serve = commands.get("serve").expect("serve defined");
        assert_eq!(serve.about(), "Start the development server");
        assert_eq!(serve.spec().synopsis(), "[-p|--port <port>] <address>");
    }

    #[test]
    fn given_named_validator_when_parsing_args_then_validator_runs() {
        let commands = CommandSet::from_toml_str(SERVE).unwrap();
        let spec = commands.get("serve").unwrap().spec();

        let err = spec.parse(["--port", "http", "localhost"]).unwrap_err();

        assert_eq!(err.to_string(), "Invalid integer \"http\".");
        assert!(matches!(err.kind(), UsageErrorKind::ValidationFailed { .. }));
    }

    #[test]
    fn given_empty_input_then_empty_set() {
        let commands = CommandSet::from_toml_str("").unwrap();
        assert!(commands.is_empty());
    }

    #[test]
    fn given_positional_and_option_names_then_definition_error() {
        let content = r#"
[[command]]
name = "bad"
[[command.argument]]
positional = "<file>"
long = "--file"
"#;
        let err = CommandSet::from_toml_str(content).unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidDefinition { ref command, .. } if command == "bad"));
    }

    #[test]
    fn given_element_without_names_then_definition_error() {
        let content = r#"
[[command]]
name = "bad"
[[command.argument]]
optional = true
"#;
        let err = CommandSet::from_toml_str(content).unwrap_err();
        assert!(err.to_string().contains("neither a positional label nor option names"));
    }

    #[test]
    fn given_unknown_field_then_file_rejected() {
        let content = r#"
[[command]]
name = "bad"
[[command.argument]]
positional = "<file>"
required = true
"#;
        let err = CommandSet::from_toml_str(content).unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidCommandFile { .. }));
    }

    #[test]
    fn given_unknown_validator_then_definition_error() {
        let content = r#"
[[command]]
name = "bad"
[[command.argument]]
positional = "<mail>"
validate = "email"
"#;
        let err = CommandSet::from_toml_str(content).unwrap_err();
        assert!(err.to_string().contains("unknown validator \"email\""));
    }

    #[test]
    fn given_duplicate_command_then_error() {
        let content = r#"
[[command]]
name = "twice"
[[command]]
name = "twice"
"#;
        let err = CommandSet::from_toml_str(content).unwrap_err();
        assert!(matches!(err, ApplicationError::DuplicateCommand(ref name) if name == "twice"));
    }

    #[test]
    fn given_grammar_error_then_command_is_named() {
        let content = r#"
[[command]]
name = "clash"
[[command.argument]]
long = "--name"
optional = true
[[command.argument]]
long = "--name"
optional = true
"#;
        let err = CommandSet::from_toml_str(content).unwrap_err();
        match err {
            ApplicationError::Grammar { command, source } => {
                assert_eq!(command, "clash");
                assert!(matches!(source, GrammarError::DuplicateId(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn given_option_like_command_name_then_rejected() {
        let content = "[[command]]\nname = \"-x\"\n";
        assert!(CommandSet::from_toml_str(content).is_err());
    }
}
