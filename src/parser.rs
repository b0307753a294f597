//! Turns resolved tokens into a [`ParsedCommand`].

use crate::error::ShellError;
use crate::lexer::Token;
use std::collections::BTreeMap;

/// A command ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The first non-empty word after alias expansion.
    pub name: String,
    /// Remaining words, flags included, in input order.
    pub args: Vec<String>,
    /// Flags found in the leading `-x` / `-xyz` / `--long[=value]` arguments.
    pub flags: BTreeMap<String, Option<String>>,
    /// How many of `args` are leading flags.
    leading_flags: usize,
    /// First quoted word in `args` that starts with `-`, unless an unquoted
    /// `--` already comes before it.
    quoted_dash: Option<usize>,
}

impl ParsedCommand {
    /// Builds a command by hand; flags are derived as if the words were typed unquoted.
    pub fn new(name: impl Into<String>, args: &[&str]) -> Self {
        let tokens: Vec<Token> = std::iter::once(name.into())
            .chain(args.iter().map(|a| a.to_string()))
            .map(Token::word)
            .collect();
        let line = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        match parse(&line, tokens) {
            Ok(Some(cmd)) => cmd,
            _ => Self {
                name: String::new(),
                args: Vec::new(),
                flags: BTreeMap::new(),
                leading_flags: 0,
                quoted_dash: None,
            },
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains_key(flag)
    }

    /// Arguments as handed to built-in argument parsers: leading short-flag
    /// clusters are split, so `-la` becomes `-l -a`, and `--` goes before a
    /// quoted word starting with `-` so it stays an operand.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        for (i, arg) in self.args.iter().enumerate() {
            if self.quoted_dash == Some(i) {
                argv.push("--".to_string());
            }
            if i < self.leading_flags && is_short_cluster(arg) {
                argv.extend(arg[1..].chars().map(|c| format!("-{}", c)));
            } else {
                argv.push(arg.clone());
            }
        }
        argv
    }
}

fn is_short_cluster(arg: &str) -> bool {
    arg.len() > 2 && arg.starts_with('-') && arg[1..].chars().all(|c| c.is_ascii_alphabetic())
}

/// Builds a [`ParsedCommand`] from resolved tokens.
///
/// Unquoted tokens that expanded to nothing are dropped. Returns `Ok(None)`
/// when no words remain.
pub fn parse(line: &str, tokens: Vec<Token>) -> Result<Option<ParsedCommand>, ShellError> {
    let mut words = tokens
        .into_iter()
        .filter(|t| !(t.text.is_empty() && t.expanded && !t.is_quoted()));

    let name = match words.next() {
        Some(token) => token.text,
        None => return Ok(None),
    };
    let rest: Vec<Token> = words.collect();

    let mut flags = BTreeMap::new();
    let mut leading_flags = 0;
    for token in &rest {
        let text = token.text.as_str();
        if token.is_quoted() || !text.starts_with('-') || text == "-" {
            break;
        }
        leading_flags += 1;
        if text == "--" {
            break;
        }
        if let Some(long) = text.strip_prefix("--") {
            let (flag, value) = match long.split_once('=') {
                Some((flag, value)) => (flag, Some(value.to_string())),
                None => (long, None),
            };
            if flag.is_empty() || flag.starts_with('-') {
                let offset = line.find(text).map_or(0, |idx| line[..idx].chars().count());
                return Err(ShellError::syntax(line, offset, format!("malformed flag '{}'", text)));
            }
            flags.insert(flag.to_string(), value);
        } else {
            for c in text[1..].chars() {
                flags.insert(c.to_string(), None);
            }
        }
    }

    let quoted_dash = rest
        .iter()
        .take_while(|t| t.is_quoted() || t.text != "--")
        .position(|t| t.is_quoted() && t.text.starts_with('-'));

    Ok(Some(ParsedCommand {
        name,
        args: rest.into_iter().map(|t| t.text).collect(),
        flags,
        leading_flags,
        quoted_dash,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::lexer::tokenize;

    fn parse_line(line: &str) -> Result<Option<ParsedCommand>, ShellError> {
        let mut env = Environment::empty("/");
        env.set_var("EMPTY", "");
        parse(line, tokenize(line, &env).unwrap())
    }

    #[test]
    fn name_and_args() {
        let cmd = parse_line("cp a.txt 'b c.txt'").unwrap().unwrap();
        assert_eq!(cmd.name, "cp");
        assert_eq!(cmd.args, vec!["a.txt", "b c.txt"]);
        assert!(cmd.flags.is_empty());
    }

    #[test]
    fn empty_expansions_are_dropped_before_the_name() {
        let cmd = parse_line("$EMPTY echo $EMPTY x \"\"").unwrap().unwrap();
        assert_eq!(cmd.name, "echo");
        assert_eq!(cmd.args, vec!["x", ""]);
        assert_eq!(parse_line("$EMPTY").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
    }

    #[test]
    fn leading_flags_are_collected() {
        let cmd = parse_line("ls -la --color=auto --all dir -x").unwrap().unwrap();
        assert!(cmd.has_flag("l"));
        assert!(cmd.has_flag("a"));
        assert_eq!(cmd.flags.get("color"), Some(&Some("auto".to_string())));
        assert_eq!(cmd.flags.get("all"), Some(&None));
        assert!(!cmd.has_flag("x"));
        assert_eq!(cmd.args.len(), 5);
    }

    #[test]
    fn double_dash_and_quotes_end_flag_scanning() {
        let cmd = parse_line("rm -- -f").unwrap().unwrap();
        assert!(!cmd.has_flag("f"));

        let cmd = parse_line("echo '-n' hi").unwrap().unwrap();
        assert!(cmd.flags.is_empty());
    }

    #[test]
    fn malformed_long_flags_are_syntax_errors() {
        assert!(matches!(
            parse_line("ls --=x"),
            Err(ShellError::Syntax { position: 3, .. })
        ));
        assert!(matches!(parse_line("ls ---x"), Err(ShellError::Syntax { .. })));
        assert!(matches!(
            parse_line("é --=x"),
            Err(ShellError::Syntax { position: 2, .. })
        ));
    }

    #[test]
    fn argv_splits_leading_clusters_only() {
        let cmd = parse_line("ls -la -h dir -xy").unwrap().unwrap();
        assert_eq!(cmd.argv(), vec!["-l", "-a", "-h", "dir", "-xy"]);

        let cmd = parse_line("head -n 5 f").unwrap().unwrap();
        assert_eq!(cmd.argv(), vec!["-n", "5", "f"]);
    }

    #[test]
    fn quoted_dash_words_stay_operands() {
        let cmd = parse_line("rm -f '-old.txt' b").unwrap().unwrap();
        assert!(cmd.has_flag("f"));
        assert_eq!(cmd.argv(), vec!["-f", "--", "-old.txt", "b"]);

        let cmd = parse_line("rm -- '-x'").unwrap().unwrap();
        assert_eq!(cmd.argv(), vec!["--", "-x"]);

        let cmd = parse_line("touch 'a b'").unwrap().unwrap();
        assert_eq!(cmd.argv(), vec!["a b"]);
    }

    #[test]
    fn new_builds_flags_like_typed_input() {
        let cmd = ParsedCommand::new("rm", &["-rf", "dir"]);
        assert_eq!(cmd.name, "rm");
        assert!(cmd.has_flag("r") && cmd.has_flag("f"));
        assert_eq!(cmd.argv(), vec!["-r", "-f", "dir"]);
    }
}
