//! Utterance normalization and the word-pattern matcher behind the rules.
//!
//! A pattern is a sequence of [`Part`]s that must consume every word of the
//! normalized utterance. Keywords compare case-insensitively; captured text
//! keeps the user's spelling.

use crate::lexer::quote;

/// One element of a rule pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    /// Exactly one of the alternatives. An alternative may be several
    /// space-separated words, matched consecutively.
    Word(&'static [&'static str]),
    /// One of the alternatives, or nothing.
    Optional(&'static [&'static str]),
    /// One or more words, as few as possible, captured under the name.
    /// Unquoted articles and words like "file" or "folder" alone never fill it.
    Slot(&'static str),
    /// Zero or more ignored words, as few as possible.
    Any,
}

/// A word of the normalized utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// As typed, without surrounding quotes.
    pub raw: String,
    /// Lowercase form used for keyword comparison.
    pub lower: String,
    /// Typed inside quotes.
    pub quoted: bool,
}

impl Term {
    fn new(raw: &str, quoted: bool) -> Self {
        Self {
            raw: raw.to_string(),
            lower: raw.to_lowercase(),
            quoted,
        }
    }

    fn is_filler(&self) -> bool {
        !self.quoted && FILLER.contains(&self.lower.as_str())
    }
}

/// Slot name → captured text, in capture order.
pub type Captures = Vec<(&'static str, String)>;

/// Words that never make up a capture on their own unless quoted.
const FILLER: &[&str] = &["the", "a", "an", "file", "files", "folder", "directory", "dir"];

const EDGE_PUNCTUATION: &[char] = &['?', '!', ',', ';', ':'];

const COURTESY: &[&[&str]] = &[
    &["please"],
    &["kindly"],
    &["can", "you"],
    &["could", "you"],
    &["would", "you"],
];

/// Splits an utterance into terms.
///
/// Whitespace collapses, `? ! , ; :` are trimmed from both ends together with
/// one sentence-ending `.` (but not `..` or a lone `.`), commas after words
/// are dropped, a quoted phrase at the start of a word becomes one term, and
/// leading courtesy words ("please", "could you", ...) plus a trailing
/// "please" are dropped.
pub fn normalize(utterance: &str) -> Vec<Term> {
    let collapsed = utterance.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut terms = split_terms(trim_punctuation(&collapsed));

    while let Some(phrase) = COURTESY.iter().find(|phrase| {
        terms.len() > phrase.len() && phrase.iter().zip(&terms).all(|(p, t)| t.lower == *p)
    }) {
        terms.drain(..phrase.len());
    }
    if terms.len() > 1 && terms.last().is_some_and(|t| t.lower == "please") {
        terms.pop();
    }
    terms
}

fn trim_punctuation(text: &str) -> &str {
    let mut text = text.trim_matches(EDGE_PUNCTUATION).trim();
    if let Some(rest) = text.strip_suffix('.') {
        if rest.chars().last().is_some_and(|c| c != '.' && !c.is_whitespace()) {
            text = rest.trim_end_matches(EDGE_PUNCTUATION).trim_end();
        }
    }
    text
}

fn split_terms(text: &str) -> Vec<Term> {
    let mut terms = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        let Some(first) = rest.chars().next() else {
            break;
        };
        if first == '"' || first == '\'' {
            let body = &rest[1..];
            if let Some(end) = body.find(first) {
                terms.push(Term::new(&body[..end], true));
                rest = &body[end + 1..];
                continue;
            }
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = rest[..end].trim_end_matches([',', ';']);
        if !word.is_empty() {
            terms.push(Term::new(word, false));
        }
        rest = &rest[end..];
    }
    terms
}

/// Matches `parts` against all of `terms`.
pub fn match_pattern(parts: &[Part], terms: &[Term]) -> Option<Captures> {
    let mut captures = Vec::new();
    match_from(parts, terms, &mut captures).then_some(captures)
}

fn match_from(parts: &[Part], terms: &[Term], captures: &mut Captures) -> bool {
    let Some((part, rest)) = parts.split_first() else {
        return terms.is_empty();
    };
    match *part {
        Part::Word(alternatives) => alternatives.iter().any(|alt| {
            phrase_len(alt, terms).is_some_and(|n| match_from(rest, &terms[n..], captures))
        }),
        Part::Optional(alternatives) => {
            alternatives.iter().any(|alt| {
                phrase_len(alt, terms).is_some_and(|n| match_from(rest, &terms[n..], captures))
            }) || match_from(rest, terms, captures)
        }
        Part::Slot(name) => (1..=terms.len()).any(|n| {
            if terms[..n].iter().all(Term::is_filler) {
                return false;
            }
            captures.push((name, join_raw(&terms[..n])));
            let matched = match_from(rest, &terms[n..], captures);
            if !matched {
                captures.pop();
            }
            matched
        }),
        Part::Any => (0..=terms.len()).any(|n| match_from(rest, &terms[n..], captures)),
    }
}

/// How many terms `phrase` covers at the start of `terms`, if it matches there.
fn phrase_len(phrase: &str, terms: &[Term]) -> Option<usize> {
    let mut n = 0;
    for word in phrase.split(' ') {
        if terms.get(n)?.lower != word {
            return None;
        }
        n += 1;
    }
    Some(n)
}

fn join_raw(terms: &[Term]) -> String {
    terms.iter().map(|t| t.raw.as_str()).collect::<Vec<_>>().join(" ")
}

/// Fills `{slot}` and `{slot:glob}` placeholders with shell-quoted captures.
///
/// Returns `None` if the template names a slot that was not captured.
pub fn render(template: &str, captures: &Captures) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let close = open + rest[open..].find('}')?;
        let (name, glob) = match rest[open + 1..close].split_once(':') {
            Some((name, "glob")) => (name, true),
            Some(_) => return None,
            None => (&rest[open + 1..close], false),
        };
        let value = &captures.iter().find(|(slot, _)| *slot == name)?.1;
        if glob {
            out.push_str(&quote(&format!("*{}*", value)));
        } else {
            out.push_str(&quote(value));
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(terms: &[Term]) -> Vec<&str> {
        terms.iter().map(|t| t.lower.as_str()).collect()
    }

    #[test]
    fn normalize_collapses_and_trims() {
        let terms = normalize("  Where   am I?  ");
        assert_eq!(lower(&terms), vec!["where", "am", "i"]);
        assert_eq!(terms[2].raw, "I");

        assert_eq!(lower(&normalize("list files.")), vec!["list", "files"]);
        assert_eq!(lower(&normalize("go to ..")), vec!["go", "to", ".."]);
        assert_eq!(lower(&normalize("cd to .")), vec!["cd", "to", "."]);
        assert_eq!(
            lower(&normalize("show readme.txt.")),
            vec!["show", "readme.txt"]
        );
    }

    #[test]
    fn normalize_keeps_quoted_phrases_and_contractions() {
        let terms = normalize("search for \"Hello World\" in 'my notes.txt'");
        let raw: Vec<&str> = terms.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(raw, vec!["search", "for", "Hello World", "in", "my notes.txt"]);

        let terms = normalize("show me what's in this directory");
        assert_eq!(terms[2].raw, "what's");
        assert_eq!(terms.len(), 6);
    }

    #[test]
    fn normalize_drops_courtesy() {
        assert_eq!(
            lower(&normalize("Could you please list all files please")),
            vec!["list", "all", "files"]
        );
        assert_eq!(lower(&normalize("please")), vec!["please"]);
    }

    #[test]
    fn slots_are_lazy_and_keep_case() {
        const PARTS: &[Part] = &[
            Part::Word(&["copy"]),
            Part::Slot("src"),
            Part::Word(&["to"]),
            Part::Slot("dst"),
            Part::Optional(&["folder"]),
        ];
        let captures = match_pattern(PARTS, &normalize("COPY File.txt to Backup folder")).unwrap();
        assert_eq!(
            captures,
            vec![("src", "File.txt".to_string()), ("dst", "Backup".to_string())]
        );
    }

    #[test]
    fn slots_never_hold_only_filler() {
        const PARTS: &[Part] = &[
            Part::Word(&["delete"]),
            Part::Optional(&["the"]),
            Part::Optional(&["file"]),
            Part::Slot("name"),
        ];
        assert!(match_pattern(PARTS, &normalize("delete the file")).is_none());
        assert!(match_pattern(PARTS, &normalize("delete the")).is_none());
        assert_eq!(
            match_pattern(PARTS, &normalize("delete the file a.txt")).unwrap(),
            vec![("name", "a.txt".to_string())]
        );
        assert_eq!(
            match_pattern(PARTS, &normalize("delete the \"file\"")).unwrap(),
            vec![("name", "file".to_string())]
        );
    }

    #[test]
    fn patterns_must_consume_everything() {
        const PARTS: &[Part] = &[Part::Word(&["where"]), Part::Word(&["am"]), Part::Word(&["i"])];
        assert!(match_pattern(PARTS, &normalize("where am i")).is_some());
        assert!(match_pattern(PARTS, &normalize("where am i going")).is_none());
        assert!(match_pattern(PARTS, &normalize("so where am i")).is_none());
    }

    #[test]
    fn multi_word_alternatives_and_any() {
        const PARTS: &[Part] = &[
            Part::Word(&["show"]),
            Part::Any,
            Part::Word(&["memory usage", "ram"]),
        ];
        assert!(match_pattern(PARTS, &normalize("show me the memory usage")).is_some());
        assert!(match_pattern(PARTS, &normalize("show ram")).is_some());
        assert!(match_pattern(PARTS, &normalize("show memory")).is_none());
    }

    #[test]
    fn render_quotes_captures() {
        let captures = vec![
            ("name", "my notes.txt".to_string()),
            ("pattern", "test".to_string()),
        ];
        assert_eq!(render("touch {name}", &captures).unwrap(), "touch 'my notes.txt'");
        assert_eq!(render("find . {pattern:glob}", &captures).unwrap(), "find . '*test*'");
        assert_eq!(render("ls -la", &captures).unwrap(), "ls -la");
        assert_eq!(render("cat {missing}", &captures), None);
    }
}
