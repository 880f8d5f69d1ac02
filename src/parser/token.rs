//! Lexical splitting of raw arguments into option and value tokens

use std::collections::VecDeque;

/// One primitive token handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `-x` or `--name` with nothing attached.
    Option(String),
    /// `-xvalue` or `--name=value`.
    OptionWithValue(String, String),
    /// Anything that does not start with an option prefix.
    Value(String),
}

impl Token {
    /// The token as the user typed it, for error messages.
    pub fn text(&self) -> String {
        match self {
            Token::Option(name) => name.clone(),
            Token::OptionWithValue(name, value) if name.starts_with("--") => {
                format!("{name}={value}")
            }
            Token::OptionWithValue(name, value) => format!("{name}{value}"),
            Token::Value(value) => value.clone(),
        }
    }
}

/// Queue of tokens over an argument list.
///
/// Splitting is lexical, except for one question only the grammar can answer:
/// whether the text glued to a short option (`-ovalue`) is its value or more
/// bundled short options (`-rf`). The parser answers it per call through
/// `takes_value`, which sees the option name including its dash.
#[derive(Debug, Default)]
pub struct Tokenizer {
    args: VecDeque<String>,
    /// Unconsumed tail of a short-option bundle, without its dash.
    bundle: Option<String>,
    pushed_back: Vec<Token>,
}

impl Tokenizer {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            bundle: None,
            pushed_back: Vec::new(),
        }
    }

    pub fn next_token(&mut self, takes_value: impl Fn(&str) -> bool) -> Option<Token> {
        if let Some(token) = self.pushed_back.pop() {
            return Some(token);
        }
        if let Some(bundle) = self.bundle.take() {
            return Some(self.short_option(&bundle, &takes_value));
        }
        let arg = self.args.pop_front()?;
        Some(self.classify(arg, &takes_value))
    }

    /// Return a token so the next call yields it again.
    pub fn push_back(&mut self, token: Token) {
        self.pushed_back.push(token);
    }

    pub fn is_empty(&self) -> bool {
        self.pushed_back.is_empty() && self.bundle.is_none() && self.args.is_empty()
    }

    /// Number of value tokens that follow before the next option that may
    /// consume a value.
    ///
    /// Options for which `is_flag` holds (name including dashes) take no
    /// values, so counting steps over them; any other option ends the run.
    pub fn leading_values(&self, is_flag: impl Fn(&str) -> bool) -> usize {
        let mut count = 0;
        for token in self.pushed_back.iter().rev() {
            match token {
                Token::Value(_) => count += 1,
                Token::Option(name) if is_flag(name) => {}
                _ => return count,
            }
        }
        if let Some(bundle) = &self.bundle {
            if !is_flag_bundle(bundle, &is_flag) {
                return count;
            }
        }
        for arg in &self.args {
            if !is_option_shaped(arg) {
                count += 1;
                continue;
            }
            let skippable = match arg.strip_prefix("--") {
                Some(long) => !long.contains('=') && is_flag(arg),
                None => is_flag_bundle(&arg[1..], &is_flag),
            };
            if !skippable {
                break;
            }
        }
        count
    }

    /// Everything not yet consumed, as raw arguments.
    pub fn into_remaining(mut self) -> Vec<String> {
        let mut remaining: Vec<String> = self.pushed_back.drain(..).rev().map(|t| t.text()).collect();
        if let Some(bundle) = self.bundle.take() {
            remaining.push(format!("-{bundle}"));
        }
        remaining.extend(self.args);
        remaining
    }

    fn classify(&mut self, arg: String, takes_value: &impl Fn(&str) -> bool) -> Token {
        if !is_option_shaped(&arg) {
            return Token::Value(arg);
        }
        if let Some(long) = arg.strip_prefix("--") {
            return match long.split_once('=') {
                Some((name, value)) => Token::OptionWithValue(format!("--{name}"), value.to_string()),
                None => Token::Option(arg),
            };
        }
        self.short_option(&arg[1..], takes_value)
    }

    fn short_option(&mut self, body: &str, takes_value: &impl Fn(&str) -> bool) -> Token {
        let mut chars = body.chars();
        let first = chars.next().unwrap_or('-');
        let rest = chars.as_str();
        let name = format!("-{first}");

        if rest.is_empty() {
            Token::Option(name)
        } else if takes_value(&name) {
            Token::OptionWithValue(name, rest.to_string())
        } else {
            self.bundle = Some(rest.to_string());
            Token::Option(name)
        }
    }
}

/// True if every short option in `body` (a bundle without its dash) is a flag.
fn is_flag_bundle(body: &str, is_flag: &impl Fn(&str) -> bool) -> bool {
    body.chars().all(|c| is_flag(&format!("-{c}")))
}

/// `-` on its own is a value (conventionally stdin); `--` is an option token
/// like any other and carries no special meaning.
fn is_option_shaped(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-')
}
