//! Single-pass recursive-descent matching of tokens against a grammar

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::grammar::{Element, Spec};
use crate::parser::error::{UsageError, UsageErrorKind, UsageResult};
use crate::parser::result::{ParseResult, Subset};
use crate::parser::token::{Token, Tokenizer};

type StepResult<T> = Result<T, UsageErrorKind>;

impl Spec {
    /// Parse an argument list (already shell-unescaped) against this grammar.
    ///
    /// Stops at the first violation; on success every value has passed its
    /// validator and every required element in every scope is bound.
    #[instrument(level = "debug", skip_all, fields(args = tracing::field::Empty))]
    pub fn parse<I, S>(&self, args: I) -> UsageResult<ParseResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        tracing::Span::current().record("args", tracing::field::debug(&args));

        let mut parser = Parser {
            tokens: Tokenizer::new(args),
            chain: Vec::new(),
        };
        parser
            .parse_top(self)
            .map_err(|kind| {
                debug!(error = %kind, "parse failed");
                UsageError::new(kind, self.clone())
            })
    }
}

struct Parser<'s> {
    tokens: Tokenizer,
    /// Scopes currently open, outermost first.
    chain: Vec<&'s [Element]>,
}

/// Matching state of one scope.
struct Scope<'s> {
    elements: &'s [Element],
    positionals: Vec<&'s Element>,
    cursor: usize,
    /// exclusion group -> id of the member bound in this scope
    groups: HashMap<&'s str, &'s str>,
    result: ParseResult,
}

impl<'s> Scope<'s> {
    fn new(elements: &'s [Element]) -> Self {
        Self {
            elements,
            positionals: elements.iter().filter(|e| e.is_positional()).collect(),
            cursor: 0,
            groups: HashMap::new(),
            result: ParseResult::default(),
        }
    }

    fn find_option(&self, name: &str) -> Option<&'s Element> {
        self.elements
            .iter()
            .find(|e| e.is_option() && e.has_name(name))
    }

    fn is_bound(&self, element: &Element) -> bool {
        self.result.local(element.id()).is_some()
    }

    fn group_taken_by_other(&self, element: &Element) -> Option<&'s Element> {
        let group = element.exclusion_group()?;
        let holder = *self.groups.get(group)?;
        if holder == element.id() {
            return None;
        }
        self.elements.iter().find(|e| e.id() == holder)
    }

    /// Required positionals after `index` that still need a value.
    fn required_after(&self, index: usize) -> usize {
        self.positionals[index + 1..]
            .iter()
            .filter(|p| !p.is_optional() && !self.is_bound(p))
            .filter(|p| self.group_taken_by_other(p).is_none())
            .count()
    }

    /// The positional the next value binds to, given how many values are
    /// available without an option in between.
    ///
    /// An optional or already-satisfied repeatable positional yields to the
    /// positionals after it when the available values are only just enough
    /// for those.
    fn next_positional(&mut self, available: usize) -> Option<&'s Element> {
        while let Some(&positional) = self.positionals.get(self.cursor) {
            let exhausted = (!positional.is_repeatable() && self.is_bound(positional))
                || self.group_taken_by_other(positional).is_some();
            let yields = (positional.is_optional() || self.is_bound(positional))
                && available <= self.required_after(self.cursor);
            if exhausted || yields {
                self.cursor += 1;
                continue;
            }
            return Some(positional);
        }
        None
    }

    fn claim_group(&mut self, element: &'s Element) -> StepResult<()> {
        if let Some(other) = self.group_taken_by_other(element) {
            return Err(UsageErrorKind::DuplicateElement {
                label: element.label().to_string(),
                conflicts_with: Some(other.label().to_string()),
            });
        }
        if let Some(group) = element.exclusion_group() {
            self.groups.insert(group, element.id());
        }
        Ok(())
    }

    /// Fails on the first required element left unbound, in declaration order.
    fn finish(self) -> StepResult<ParseResult> {
        for element in self.elements {
            if element.is_optional() || self.is_bound(element) {
                continue;
            }
            match element.exclusion_group() {
                Some(group) if self.groups.contains_key(group) => continue,
                Some(group) => {
                    let members: Vec<&str> = self
                        .elements
                        .iter()
                        .filter(|e| e.exclusion_group() == Some(group))
                        .map(Element::label)
                        .collect();
                    return Err(UsageErrorKind::MissingRequiredArgument(members.join("|")));
                }
                None => {
                    return Err(UsageErrorKind::MissingRequiredArgument(
                        element.label().to_string(),
                    ))
                }
            }
        }
        Ok(self.result)
    }
}

impl<'s> Parser<'s> {
    fn parse_top(&mut self, spec: &'s Spec) -> StepResult<ParseResult> {
        let mut scope = Scope::new(spec.elements());
        self.chain.push(spec.elements());

        while let Some(token) = self.next_token() {
            match token {
                Token::Option(name) => {
                    let element = scope
                        .find_option(&name)
                        .ok_or(UsageErrorKind::UnexpectedOption(name))?;
                    self.bind_option(&mut scope, element, None)?;
                }
                Token::OptionWithValue(name, value) => {
                    let element = scope
                        .find_option(&name)
                        .ok_or_else(|| UsageErrorKind::UnexpectedOption(name.clone()))?;
                    self.bind_option(&mut scope, element, Some(value))?;
                }
                Token::Value(value) => {
                    let available = 1 + self.available_values();
                    let positional = scope
                        .next_positional(available)
                        .ok_or_else(|| UsageErrorKind::UnexpectedArgument(value.clone()))?;
                    bind_value(&mut scope, positional, value)?;
                    if !spec.accepts_leading_arguments() {
                        let trailing = std::mem::take(&mut self.tokens).into_remaining();
                        debug!(?trailing, "dispatching remainder");
                        scope.result.set_trailing(trailing);
                        break;
                    }
                }
            }
        }

        self.chain.pop();
        scope.finish()
    }

    /// Parse one occurrence of an option's parameter grammar.
    ///
    /// The scope closes on the first token it cannot use (an option it does
    /// not declare, or a value with no positional left); that token goes back
    /// to the enclosing scope.
    fn parse_nested(&mut self, elements: &'s [Element]) -> StepResult<Subset> {
        let mut scope = Scope::new(elements);
        self.chain.push(elements);
        debug!(depth = self.chain.len(), "open scope");

        while let Some(token) = self.next_token() {
            let consumed = match token {
                Token::Option(name) => match scope.find_option(&name) {
                    Some(element) => {
                        self.bind_option(&mut scope, element, None)?;
                        true
                    }
                    None => {
                        self.tokens.push_back(Token::Option(name));
                        false
                    }
                },
                Token::OptionWithValue(name, value) => match scope.find_option(&name) {
                    Some(element) => {
                        self.bind_option(&mut scope, element, Some(value))?;
                        true
                    }
                    None => {
                        self.tokens.push_back(Token::OptionWithValue(name, value));
                        false
                    }
                },
                Token::Value(value) => {
                    let available = 1 + self.available_values();
                    match scope.next_positional(available) {
                        Some(positional) => {
                            bind_value(&mut scope, positional, value)?;
                            true
                        }
                        None => {
                            self.tokens.push_back(Token::Value(value));
                            false
                        }
                    }
                }
            };
            if !consumed {
                break;
            }
        }

        debug!(depth = self.chain.len(), "close scope");
        self.chain.pop();
        scope.finish()
    }

    fn bind_option(
        &mut self,
        scope: &mut Scope<'s>,
        element: &'s Element,
        attached: Option<String>,
    ) -> StepResult<()> {
        trace!(option = element.label(), ?attached, "bind option");
        if scope.is_bound(element) && !element.is_repeatable() {
            return Err(UsageErrorKind::DuplicateElement {
                label: element.label().to_string(),
                conflicts_with: None,
            });
        }
        scope.claim_group(element)?;

        if let Some(value) = attached {
            if !element.takes_value() {
                return Err(UsageErrorKind::UnexpectedArgument(value));
            }
            self.tokens.push_back(Token::Value(value));
        }

        let subset = if element.parameters().is_empty() {
            Subset::default()
        } else {
            self.parse_nested(element.parameters())?
        };
        if element.has_validator() {
            if let Some(value) = subset.bindings().find_map(|b| b.values().first().copied()) {
                validate(element, value)?;
            }
        }
        scope.result.push_occurrence(element, subset);
        Ok(())
    }

    /// Values ahead of the cursor, stepping over options known to take none.
    fn available_values(&self) -> usize {
        self.tokens.leading_values(|name| {
            self.find_in_chain(name)
                .is_some_and(|e| e.parameters().is_empty())
        })
    }

    /// Innermost open scope declaring the option `name` wins.
    fn find_in_chain(&self, name: &str) -> Option<&'s Element> {
        self.chain
            .iter()
            .rev()
            .copied()
            .find_map(|scope| scope.iter().find(|e| e.is_option() && e.has_name(name)))
    }

    fn next_token(&mut self) -> Option<Token> {
        let chain = &self.chain;
        let token = self.tokens.next_token(|name| {
            chain
                .iter()
                .rev()
                .find_map(|scope| scope.iter().find(|e| e.is_option() && e.has_name(name)))
                .is_some_and(Element::takes_value)
        });
        trace!(?token, "next token");
        token
    }
}

fn bind_value<'s>(scope: &mut Scope<'s>, positional: &'s Element, value: String) -> StepResult<()> {
    trace!(positional = positional.label(), %value, "bind value");
    validate(positional, &value)?;
    scope.claim_group(positional)?;
    scope.result.push_value(positional, value);
    Ok(())
}

fn validate(element: &Element, value: &str) -> StepResult<()> {
    element
        .validate(value)
        .map_err(|message| UsageErrorKind::ValidationFailed {
            label: element.label().to_string(),
            message,
        })
}
