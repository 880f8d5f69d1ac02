//! The complete argument grammar of one command

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::grammar::element::{Element, ElementBuilder};
use crate::grammar::error::{GrammarError, GrammarResult};

/// Declared grammar for one command's arguments.
///
/// Cheap to clone and immutable once built, so a single `Spec` can be parsed
/// against any number of argument lists, from any thread.
#[derive(Debug, Clone)]
pub struct Spec {
    inner: Arc<SpecInner>,
}

#[derive(Debug)]
struct SpecInner {
    accepts_leading_arguments: bool,
    elements: Vec<Element>,
}

impl Spec {
    /// Build a spec from top-level elements.
    ///
    /// With `accepts_leading_arguments = false` the spec belongs to a
    /// dispatcher: its first positional names a sub-command, and every token
    /// after that positional is left unparsed for the sub-command.
    pub fn new<I, E>(accepts_leading_arguments: bool, elements: I) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<ElementBuilder>,
    {
        let elements = elements
            .into_iter()
            .map(|e| e.into().build())
            .collect::<GrammarResult<Vec<_>>>()?;
        validate_scope(&elements)?;
        Ok(Self {
            inner: Arc::new(SpecInner {
                accepts_leading_arguments,
                elements,
            }),
        })
    }

    pub fn accepts_leading_arguments(&self) -> bool {
        self.inner.accepts_leading_arguments
    }

    pub fn elements(&self) -> &[Element] {
        &self.inner.elements
    }

    /// Top-level element with the given id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.inner.elements.iter().find(|e| e.id() == id)
    }

    /// True if both handles point at the same built grammar.
    pub fn same_as(&self, other: &Spec) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Check the invariants of one scope (top-level or one parameter grammar).
///
/// Nested scopes are checked when their option is built, so this only looks
/// at the direct children.
pub(crate) fn validate_scope(elements: &[Element]) -> GrammarResult<()> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    let mut groups: HashMap<&str, bool> = HashMap::new();

    for element in elements {
        if !ids.insert(element.id()) {
            return Err(GrammarError::DuplicateId(element.id().to_string()));
        }
        for name in [element.short_name(), element.long_name()].into_iter().flatten() {
            if !names.insert(name) {
                return Err(GrammarError::DuplicateOptionName(name.to_string()));
            }
        }
        if let Some(group) = element.exclusion_group() {
            let optional = *groups.entry(group).or_insert(element.is_optional());
            if optional != element.is_optional() {
                return Err(GrammarError::InconsistentExclusionGroup {
                    group: group.to_string(),
                });
            }
        }
    }
    Ok(())
}
