//! Lexical analysis of a command line: word splitting, quoting, escaping and
//! `$VAR` expansion.

use crate::env::Environment;
use crate::error::ShellError;
use std::borrow::Cow;

/// How a token was quoted in the input.
///
/// A token built from several regions (`a"b c"'d'`) reports the quoting of its
/// first quoted region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    None,
    Single,
    Double,
}

/// A word of input after quoting, escaping and expansion have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Final text of the word.
    pub text: String,
    /// Quoting kind, see [`Quoting`].
    pub quoting: Quoting,
    /// Whether at least one `$NAME` reference was substituted.
    pub expanded: bool,
}

impl Token {
    /// An unquoted, unexpanded word.
    pub fn word(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoting: Quoting::None,
            expanded: false,
        }
    }

    pub fn is_quoted(&self) -> bool {
        self.quoting != Quoting::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote(usize), // position of the opening quote
    ReadingDoubleQuote(usize), // position of the opening quote
}

struct LexingFSM<'a> {
    line: &'a str,
    env: &'a Environment,
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    quoting: Quoting,
    expanded: bool,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str, env: &'a Environment) -> Self {
        LexingFSM {
            line,
            env,
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
            quoting: Quoting::None,
            expanded: false,
        }
    }

    /// Runs the state machine over the whole line.
    ///
    /// Fails if a quote or a `${` is left open.
    fn make_tokens(&mut self) -> Result<Vec<Token>, ShellError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch, &mut out)?,
                LexingState::ReadingWord => self.handle_word(ch, &mut out)?,
                LexingState::ReadingSingleQuote(_) => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote(_) => self.handle_double_quote(ch)?,
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote(at) => {
                return Err(ShellError::syntax(
                    self.line,
                    at,
                    "unterminated quote '\\''",
                ));
            }
            LexingState::ReadingDoubleQuote(at) => {
                return Err(ShellError::syntax(self.line, at, "unterminated quote '\"'"));
            }
            LexingState::ReadingWord => self.finish_token(&mut out),
            LexingState::Start => {}
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_start(&mut self, ch: char, out: &mut Vec<Token>) -> Result<(), ShellError> {
        match ch {
            ' ' | '\t' => Ok(()),
            c => {
                self.state = LexingState::ReadingWord;
                self.handle_word(c, out)
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<Token>) -> Result<(), ShellError> {
        match ch {
            ' ' | '\t' => {
                self.finish_token(out);
                self.state = LexingState::Start;
            }
            '\'' => {
                self.mark_quoted(Quoting::Single);
                self.state = LexingState::ReadingSingleQuote(self.pos - 1);
            }
            '"' => {
                self.mark_quoted(Quoting::Double);
                self.state = LexingState::ReadingDoubleQuote(self.pos - 1);
            }
            '\\' => match self.peek_char() {
                Some(next @ (' ' | '\t' | '\'' | '"' | '\\' | '$')) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                _ => self.buffer.push('\\'),
            },
            '$' => self.expand()?,
            c => self.buffer.push(c),
        }
        Ok(())
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) -> Result<(), ShellError> {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.peek_char() {
                Some(next @ ('"' | '\\' | '$')) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                _ => self.buffer.push('\\'),
            },
            '$' => self.expand()?,
            c => self.buffer.push(c),
        }
        Ok(())
    }

    /// Expands `$NAME` or `${NAME}`; the `$` has already been consumed.
    ///
    /// Undefined variables expand to the empty string. A `$` that does not
    /// start a name is kept literally.
    fn expand(&mut self) -> Result<(), ShellError> {
        let dollar_at = self.pos - 1;
        let name = match self.peek_char() {
            Some('{') => {
                self.read_char();
                let mut name = String::new();
                loop {
                    match self.read_char() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(ShellError::syntax(
                                self.line,
                                dollar_at + 1,
                                "unterminated '{' in variable reference",
                            ));
                        }
                    }
                }
                if !is_valid_name(&name) {
                    return Err(ShellError::syntax(
                        self.line,
                        dollar_at,
                        format!("bad substitution '${{{}}}'", name),
                    ));
                }
                name
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        self.read_char();
                    } else {
                        break;
                    }
                }
                name
            }
            _ => {
                self.buffer.push('$');
                return Ok(());
            }
        };

        if let Some(value) = self.env.get_var(&name) {
            self.buffer.push_str(value);
        }
        self.expanded = true;
        Ok(())
    }

    fn mark_quoted(&mut self, quoting: Quoting) {
        if self.quoting == Quoting::None {
            self.quoting = quoting;
        }
    }

    fn finish_token(&mut self, out: &mut Vec<Token>) {
        out.push(Token {
            text: std::mem::take(&mut self.buffer),
            quoting: std::mem::replace(&mut self.quoting, Quoting::None),
            expanded: std::mem::take(&mut self.expanded),
        });
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits `line` into tokens, expanding variables from `env`.
///
/// # Returns
/// The tokens in input order, or [`ShellError::Syntax`] naming the unterminated
/// quote (or `${`) and its character position.
pub fn tokenize(line: &str, env: &Environment) -> Result<Vec<Token>, ShellError> {
    let mut lexer = LexingFSM::new(line, env);
    lexer.make_tokens()
}

/// Quotes `text` so that [`tokenize`] reads it back as exactly one token with
/// the same text.
///
/// A leading `-` is always quoted, so the word is read as an operand.
pub fn quote(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed("''");
    }
    let safe = !text.starts_with('-')
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || "-_./,:@%+=~^".contains(c));
    if safe {
        return Cow::Borrowed(text);
    }
    if !text.contains('\'') {
        return Cow::Owned(format!("'{}'", text));
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}
