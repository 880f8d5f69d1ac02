//! Grammar elements: positionals and options, plus their builder

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::grammar::error::{GrammarError, GrammarResult};
use crate::grammar::spec::validate_scope;

static SHORT_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-[A-Za-z0-9?]$").unwrap());
static LONG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap());

/// Checks a raw value bound to an element. `Err` carries the message shown to the user.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// One declared argument of a command.
///
/// Positionals and options share identity, label, optionality, repetition,
/// validation and exclusion-group membership; the option-specific part lives
/// in [`ElementKind::Option`].
#[derive(Clone)]
pub struct Element {
    id: String,
    label: String,
    optional: bool,
    repeatable: bool,
    validator: Option<Validator>,
    exclusion_group: Option<String>,
    kind: ElementKind,
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Positional,
    Option {
        short: Option<String>,
        long: Option<String>,
        /// Elements consumed right after the option token, in their own scope.
        parameters: Vec<Element>,
    },
}

impl Element {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn exclusion_group(&self) -> Option<&str> {
        self.exclusion_group.as_deref()
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, ElementKind::Option { .. })
    }

    pub fn is_positional(&self) -> bool {
        matches!(self.kind, ElementKind::Positional)
    }

    /// Short name including its dash, e.g. `-l`.
    pub fn short_name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Option { short, .. } => short.as_deref(),
            ElementKind::Positional => None,
        }
    }

    /// Long name including its dashes, e.g. `--long`.
    pub fn long_name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Option { long, .. } => long.as_deref(),
            ElementKind::Positional => None,
        }
    }

    /// Nested parameter grammar; always empty for positionals.
    pub fn parameters(&self) -> &[Element] {
        match &self.kind {
            ElementKind::Option { parameters, .. } => parameters,
            ElementKind::Positional => &[],
        }
    }

    /// An option takes an attached value (`-ovalue`, `--opt=value`) when its
    /// parameter grammar starts with a positional.
    pub fn takes_value(&self) -> bool {
        self.parameters()
            .first()
            .is_some_and(|first| first.is_positional())
    }

    /// True if `name` (with dashes) is one of this option's names.
    pub fn has_name(&self, name: &str) -> bool {
        self.short_name() == Some(name) || self.long_name() == Some(name)
    }

    /// Run the validator, if any, against a raw value.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match &self.validator {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("optional", &self.optional)
            .field("repeatable", &self.repeatable)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("exclusion_group", &self.exclusion_group)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Start a positional element with the given display label.
pub fn positional(label: impl Into<String>) -> ElementBuilder {
    ElementBuilder::new(label.into(), None)
}

/// Start an option with both a short (`-l`) and a long (`--long`) name.
///
/// Pass an empty string to leave one of them out; leaving out both is a
/// construction error.
pub fn option(short: &str, long: &str) -> ElementBuilder {
    let short = (!short.is_empty()).then(|| short.to_string());
    let long = (!long.is_empty()).then(|| long.to_string());
    let label = long.clone().or_else(|| short.clone()).unwrap_or_default();
    ElementBuilder::new(label, Some(OptionNames { short, long }))
}

/// Start an option that only has a short name.
pub fn short_option(short: &str) -> ElementBuilder {
    option(short, "")
}

/// Start an option that only has a long name.
pub fn long_option(long: &str) -> ElementBuilder {
    option("", long)
}

/// Fluent builder for [`Element`]; all checks run in [`ElementBuilder::build`].
#[derive(Clone)]
pub struct ElementBuilder {
    id: Option<String>,
    label: String,
    optional: bool,
    repeatable: bool,
    validator: Option<Validator>,
    exclusion_group: Option<String>,
    names: Option<OptionNames>,
    parameters: Vec<ElementBuilder>,
}

#[derive(Clone)]
struct OptionNames {
    short: Option<String>,
    long: Option<String>,
}

impl ElementBuilder {
    fn new(label: String, names: Option<OptionNames>) -> Self {
        Self {
            id: None,
            label,
            optional: false,
            repeatable: false,
            validator: None,
            exclusion_group: None,
            names,
            parameters: Vec::new(),
        }
    }

    /// Identity independent of the display label.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace the display label (options default to their long, then short name).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn exclusion_group(mut self, group: impl Into<String>) -> Self {
        self.exclusion_group = Some(group.into());
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Share an already constructed validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Append an element to the option's parameter grammar.
    pub fn parameter(mut self, parameter: impl Into<ElementBuilder>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn build(self) -> GrammarResult<Element> {
        let Some(OptionNames { short, long }) = self.names else {
            if self.label.is_empty() {
                return Err(GrammarError::EmptyLabel);
            }
            if !self.parameters.is_empty() {
                return Err(GrammarError::ParametersOnPositional(self.label));
            }
            let id = self.id.unwrap_or_else(|| self.label.clone());
            if id.is_empty() {
                return Err(GrammarError::EmptyId(self.label));
            }
            return Ok(Element {
                id,
                label: self.label,
                optional: self.optional,
                repeatable: self.repeatable,
                validator: self.validator,
                exclusion_group: self.exclusion_group,
                kind: ElementKind::Positional,
            });
        };

        if short.is_none() && long.is_none() {
            return Err(GrammarError::MissingOptionName {
                label: self.id.unwrap_or(self.label),
            });
        }
        if let Some(name) = short.as_deref().filter(|n| !SHORT_NAME.is_match(n)) {
            return Err(GrammarError::InvalidOptionName(name.to_string()));
        }
        if let Some(name) = long.as_deref().filter(|n| !LONG_NAME.is_match(n)) {
            return Err(GrammarError::InvalidOptionName(name.to_string()));
        }
        if self.label.is_empty() {
            return Err(GrammarError::EmptyLabel);
        }
        let id = self.id.unwrap_or_else(|| self.label.clone());
        if id.is_empty() {
            return Err(GrammarError::EmptyId(self.label));
        }

        let parameters = self
            .parameters
            .into_iter()
            .map(ElementBuilder::build)
            .collect::<GrammarResult<Vec<_>>>()?;
        validate_scope(&parameters)?;

        Ok(Element {
            id,
            label: self.label,
            optional: self.optional,
            repeatable: self.repeatable,
            validator: self.validator,
            exclusion_group: self.exclusion_group,
            kind: ElementKind::Option {
                short,
                long,
                parameters,
            },
        })
    }
}

impl From<Element> for ElementBuilder {
    fn from(element: Element) -> Self {
        let (names, parameters) = match element.kind {
            ElementKind::Positional => (None, Vec::new()),
            ElementKind::Option {
                short,
                long,
                parameters,
            } => (
                Some(OptionNames { short, long }),
                parameters.into_iter().map(ElementBuilder::from).collect(),
            ),
        };
        Self {
            id: Some(element.id),
            label: element.label,
            optional: element.optional,
            repeatable: element.repeatable,
            validator: element.validator,
            exclusion_group: element.exclusion_group,
            names,
            parameters,
        }
    }
}

impl From<&Element> for ElementBuilder {
    fn from(element: &Element) -> Self {
        Self::from(element.clone())
    }
}
