//! Read-only query API over parsed arguments

use crate::grammar::Element;

/// Anything that names an element: the element itself or its id.
pub trait ElementKey {
    fn element_id(&self) -> &str;
}

impl ElementKey for Element {
    fn element_id(&self) -> &str {
        self.id()
    }
}

impl ElementKey for str {
    fn element_id(&self) -> &str {
        self
    }
}

impl ElementKey for String {
    fn element_id(&self) -> &str {
        self
    }
}

/// Values bound by one successful parse, in encounter order.
///
/// Lookups search this scope first and then descend into the single
/// occurrence of every non-repeatable option, so a value nested under
/// `--output <file>` is reachable as `get_value("<file>")`. Repeatable
/// options keep their occurrences apart; reach them through `get_subsets`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    bindings: Vec<Binding>,
    trailing: Vec<String>,
}

/// The bindings of one occurrence of an option's parameter grammar.
pub type Subset = ParseResult;

/// Everything bound to one element within a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    id: String,
    label: String,
    repeatable: bool,
    bound: Bound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// Raw values of a positional.
    Values(Vec<String>),
    /// One subset per occurrence of an option.
    Occurrences(Vec<Subset>),
}

impl Binding {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn bound(&self) -> &Bound {
        &self.bound
    }

    /// Values of a positional, or the primary value of each option occurrence.
    pub fn values(&self) -> Vec<&str> {
        match &self.bound {
            Bound::Values(values) => values.iter().map(String::as_str).collect(),
            Bound::Occurrences(subsets) => subsets.iter().flat_map(Subset::primary_values).collect(),
        }
    }

    pub fn subsets(&self) -> &[Subset] {
        match &self.bound {
            Bound::Occurrences(subsets) => subsets,
            Bound::Values(_) => &[],
        }
    }

    /// How many times the element was matched.
    pub fn count(&self) -> usize {
        match &self.bound {
            Bound::Values(values) => values.len(),
            Bound::Occurrences(subsets) => subsets.len(),
        }
    }
}

impl ParseResult {
    pub fn has_option<K: ElementKey + ?Sized>(&self, key: &K) -> bool {
        self.find(key.element_id()).is_some()
    }

    /// The single value bound to an element.
    ///
    /// For an option this is the value of its first bound positional
    /// parameter (`--port 80` gives `"80"`); a bare flag has none.
    pub fn get_value<K: ElementKey + ?Sized>(&self, key: &K) -> Option<&str> {
        self.find(key.element_id())
            .and_then(|binding| binding.values().into_iter().next())
    }

    /// All values bound to an element, in encounter order.
    pub fn get_values<K: ElementKey + ?Sized>(&self, key: &K) -> Vec<&str> {
        self.find(key.element_id())
            .map(Binding::values)
            .unwrap_or_default()
    }

    /// One subset per occurrence of an option, in encounter order.
    pub fn get_subsets<K: ElementKey + ?Sized>(&self, key: &K) -> &[Subset] {
        self.find(key.element_id())
            .map(Binding::subsets)
            .unwrap_or_default()
    }

    /// Number of occurrences (options) or values (positionals); 0 if unbound.
    pub fn count<K: ElementKey + ?Sized>(&self, key: &K) -> usize {
        self.find(key.element_id()).map_or(0, Binding::count)
    }

    /// Arguments a dispatcher spec left for its sub-command.
    pub fn trailing(&self) -> &[String] {
        &self.trailing
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.trailing.is_empty()
    }

    fn find(&self, id: &str) -> Option<&Binding> {
        if let Some(binding) = self.bindings.iter().find(|b| b.id == id) {
            return Some(binding);
        }
        self.bindings
            .iter()
            .filter(|b| !b.repeatable)
            .flat_map(Binding::subsets)
            .find_map(|subset| subset.find(id))
    }

    fn primary_values(&self) -> Vec<&str> {
        self.bindings
            .iter()
            .find_map(|b| match &b.bound {
                Bound::Values(values) => Some(values.iter().map(String::as_str).collect()),
                Bound::Occurrences(_) => None,
            })
            .unwrap_or_default()
    }

    // Mutation is restricted to the parser, which only ever appends.

    pub(crate) fn local(&self, id: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    pub(crate) fn push_value(&mut self, element: &Element, value: String) {
        match self.bindings.iter_mut().find(|b| b.id == element.id()) {
            Some(Binding {
                bound: Bound::Values(values),
                ..
            }) => values.push(value),
            _ => self.bindings.push(Binding::new(element, Bound::Values(vec![value]))),
        }
    }

    pub(crate) fn push_occurrence(&mut self, element: &Element, subset: Subset) {
        match self.bindings.iter_mut().find(|b| b.id == element.id()) {
            Some(Binding {
                bound: Bound::Occurrences(subsets),
                ..
            }) => subsets.push(subset),
            _ => self
                .bindings
                .push(Binding::new(element, Bound::Occurrences(vec![subset]))),
        }
    }

    pub(crate) fn set_trailing(&mut self, trailing: Vec<String>) {
        self.trailing = trailing;
    }
}

impl Binding {
    fn new(element: &Element, bound: Bound) -> Self {
        Self {
            id: element.id().to_string(),
            label: element.label().to_string(),
            repeatable: element.is_repeatable(),
            bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{option, positional};

    fn element(builder: crate::grammar::ElementBuilder) -> Element {
        builder.build().unwrap()
    }

    #[test]
    fn given_positional_values_then_queries_return_them_in_order() {
        let files = element(positional("<file>").repeatable());
        let mut result = ParseResult::default();
        result.push_value(&files, "a".into());
        result.push_value(&files, "b".into());

        assert!(result.has_option(&files));
        assert_eq!(result.get_value(&files), Some("a"));
        assert_eq!(result.get_values("<file>"), vec!["a", "b"]);
        assert_eq!(result.count("<file>"), 2);
        assert!(result.get_subsets(&files).is_empty());
    }

    #[test]
    fn given_unbound_element_then_queries_are_empty() {
        let result = ParseResult::default();
        assert!(!result.has_option("--missing"));
        assert_eq!(result.get_value("--missing"), None);
        assert!(result.get_values("--missing").is_empty());
        assert!(result.get_subsets("--missing").is_empty());
        assert_eq!(result.count("--missing"), 0);
        assert!(result.is_empty());
    }

    #[test]
    fn given_option_occurrences_then_values_are_primary_parameters() {
        let header = element(
            option("-H", "--header")
                .repeatable()
                .parameter(positional("<header>")),
        );
        let value = element(positional("<header>"));
        let mut result = ParseResult::default();
        for h in ["a: 1", "b: 2"] {
            let mut subset = Subset::default();
            subset.push_value(&value, h.into());
            result.push_occurrence(&header, subset);
        }

        assert_eq!(result.count(&header), 2);
        assert_eq!(result.get_values(&header), vec!["a: 1", "b: 2"]);
        assert_eq!(result.get_subsets(&header)[1].get_value("<header>"), Some("b: 2"));
        // repeatable occurrences are not searched through
        assert_eq!(result.get_value("<header>"), None);
    }

    #[test]
    fn given_single_option_occurrence_then_nested_value_is_reachable() {
        let output = element(option("-o", "--output").parameter(positional("<file>")));
        let file = element(positional("<file>"));
        let mut subset = Subset::default();
        subset.push_value(&file, "out.txt".into());
        let mut result = ParseResult::default();
        result.push_occurrence(&output, subset);

        assert_eq!(result.get_value(&output), Some("out.txt"));
        assert_eq!(result.get_value("<file>"), Some("out.txt"));
        assert!(result.has_option("<file>"));
    }

    #[test]
    fn given_flag_without_parameters_then_has_no_value() {
        let verbose = element(option("-v", "--verbose"));
        let mut result = ParseResult::default();
        result.push_occurrence(&verbose, Subset::default());

        assert!(result.has_option("--verbose"));
        assert_eq!(result.get_value("--verbose"), None);
        assert_eq!(result.count("--verbose"), 1);
    }
}
