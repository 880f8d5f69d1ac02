//! Usage synopsis rendering
//!
//! Turns a [`Spec`] into the `usage:` line shown with every error and help
//! text. Each top-level fragment is an atom for wrapping: a line break only
//! ever falls between two fragments, and continuation lines start in the
//! column right after `usage: <command> `.

use std::collections::HashSet;

use itertools::Itertools;

use crate::grammar::{Element, ElementKind, Spec};

impl Spec {
    /// Unwrapped synopsis, e.g. `[-v|--verbose] <file>...`.
    pub fn synopsis(&self) -> String {
        scope_fragments(self.elements()).join(" ")
    }

    /// Wrapped `usage:` block; see [`render_usage`].
    pub fn usage(&self, command_name: &str, width: usize) -> String {
        render_usage(self, command_name, width)
    }
}

/// Render `usage: <command_name> <synopsis>`, wrapped to `width` columns.
///
/// A fragment wider than the remaining space starts a new line; a fragment
/// wider than a whole line is placed alone on its line rather than split.
pub fn render_usage(spec: &Spec, command_name: &str, width: usize) -> String {
    let prefix = if command_name.is_empty() {
        "usage:".to_string()
    } else {
        format!("usage: {command_name}")
    };
    let indent = display_width(&prefix) + 1;

    let mut lines: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut used = indent;
    for atom in scope_fragments(spec.elements()) {
        let len = display_width(&atom);
        if !current.is_empty() && used + 1 + len > width {
            lines.push(std::mem::take(&mut current));
            used = indent;
        }
        used += if current.is_empty() { len } else { 1 + len };
        current.push(atom);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let mut out = prefix;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(&" ".repeat(indent - 1));
        }
        out.push(' ');
        out.push_str(&line.iter().join(" "));
    }
    out
}

/// Fragments of one scope in declaration order; the members of an exclusion
/// group collapse into one fragment at the position of the first member.
fn scope_fragments(elements: &[Element]) -> Vec<String> {
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut fragments = Vec::new();

    for element in elements {
        let Some(group) = element.exclusion_group() else {
            fragments.push(element_fragment(element, false));
            continue;
        };
        if !emitted.insert(group) {
            continue;
        }
        let members: Vec<&Element> = elements
            .iter()
            .filter(|e| e.exclusion_group() == Some(group))
            .collect();
        if members.len() == 1 {
            fragments.push(element_fragment(element, false));
            continue;
        }
        let alternatives = members
            .iter()
            .map(|member| element_fragment(member, true))
            .join(" | ");
        if element.is_optional() {
            fragments.push(format!("[{alternatives}]"));
        } else {
            fragments.push(format!("({alternatives})"));
        }
    }
    fragments
}

/// Inside a group the group's own brackets carry optionality.
fn element_fragment(element: &Element, in_group: bool) -> String {
    let (body, multi_word) = match element.kind() {
        ElementKind::Positional => (element.label().to_string(), false),
        ElementKind::Option {
            short,
            long,
            parameters,
        } => {
            let names = [short.as_deref(), long.as_deref()].into_iter().flatten().join("|");
            if parameters.is_empty() {
                (names, false)
            } else {
                let params = scope_fragments(parameters).join(" ");
                (format!("{names} {params}"), true)
            }
        }
    };

    let mut fragment = if element.is_optional() && !in_group {
        format!("[{body}]")
    } else if element.is_repeatable() && multi_word {
        format!("({body})")
    } else {
        body
    };
    if element.is_repeatable() {
        fragment.push_str("...");
    }
    fragment
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{long_option, option, positional};

    fn long_spec() -> Spec {
        Spec::new(
            true,
            [
                option("-l", "--long").repeatable().parameter(positional("foo")),
                option("-v", "--verbose").optional(),
                long_option("--json").optional().exclusion_group("format"),
                long_option("--yaml").optional().exclusion_group("format"),
                positional("<address>"),
                positional("<name>=<value>").optional().repeatable(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn given_elements_then_synopsis_renders_each_shape() {
        assert_eq!(
            long_spec().synopsis(),
            "(-l|--long foo)... [-v|--verbose] [--json | --yaml] <address> [<name>=<value>]..."
        );
    }

    #[test]
    fn given_required_group_then_renders_parentheses() {
        let spec = Spec::new(
            true,
            [
                positional("<file>").exclusion_group("input"),
                long_option("--stdin").exclusion_group("input"),
            ],
        )
        .unwrap();
        assert_eq!(spec.synopsis(), "(<file> | --stdin)");
    }

    #[test]
    fn given_nested_options_then_renders_recursively() {
        let spec = Spec::new(
            true,
            [option("-e", "--env")
                .optional()
                .repeatable()
                .parameter(positional("<name>"))
                .parameter(long_option("--secret").optional())],
        )
        .unwrap();
        assert_eq!(spec.synopsis(), "[-e|--env <name> [--secret]]...");
    }

    #[test]
    fn given_wide_output_then_stays_on_one_line() {
        let spec = Spec::new(true, [option("-v", "--verbose").optional(), positional("<file>")]).unwrap();
        assert_eq!(
            render_usage(&spec, "myapp cmd alias", 80),
            "usage: myapp cmd alias [-v|--verbose] <file>"
        );
    }

    #[test]
    fn given_narrow_output_then_wraps_under_first_fragment() {
        let usage = render_usage(&long_spec(), "myapp env", 45);
        let expected = "\
usage: myapp env (-l|--long foo)...
                 [-v|--verbose]
                 [--json | --yaml] <address>
                 [<name>=<value>]...";
        assert_eq!(usage, expected);
        assert!(usage.lines().all(|line| line.chars().count() <= 45));
    }

    #[test]
    fn given_fragment_wider_than_line_then_it_is_not_split() {
        let spec = Spec::new(
            true,
            [
                positional("<a-very-long-positional-label>"),
                positional("<b>"),
            ],
        )
        .unwrap();
        assert_eq!(
            render_usage(&spec, "cmd", 20),
            "usage: cmd <a-very-long-positional-label>\n           <b>"
        );
    }

    #[test]
    fn given_empty_spec_then_prints_prefix_only() {
        let spec = Spec::new(true, Vec::<Element>::new()).unwrap();
        assert_eq!(render_usage(&spec, "myapp list", 80), "usage: myapp list");
    }
}
