//! Rule-based translation of plain-English requests into shell commands.

pub mod pattern;
pub mod rules;

use pattern::{match_pattern, normalize, render};
pub use rules::{RULES, Rule};
use tracing::debug;

/// What the interpreter made of one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretationResult {
    pub utterance: String,
    /// Id of the rule that matched.
    pub rule: Option<&'static str>,
    /// The canonical command line, ready for the literal pipeline.
    pub command: Option<String>,
    pub action: Option<&'static str>,
}

impl InterpretationResult {
    fn unmatched(utterance: &str) -> Self {
        Self {
            utterance: utterance.to_string(),
            rule: None,
            command: None,
            action: None,
        }
    }

    pub fn matched(&self) -> bool {
        self.command.is_some()
    }
}

const EXAMPLES: &[&str] = &[
    "create a new file called example.txt",
    "create a new folder called documents",
    "list all files",
    "show me the files",
    "copy file.txt to backup.txt",
    "move file.txt to documents folder",
    "delete the file temp.txt",
    "show the contents of readme.txt",
    "search for files named test",
    "search for 'hello' in file.txt",
    "show system memory usage",
    "show disk usage",
    "what processes are running",
    "where am I",
];

const CAPABILITIES: &str = "\
Natural Language Capabilities:

File operations:
  - create a file called notes.txt
  - make a folder named documents
  - copy file1.txt to file2.txt
  - move document.txt to archive folder
  - delete the file old.txt
  - show the contents of readme.txt
  - show the first lines of log.txt

Navigation:
  - where am I
  - go to the documents folder
  - go up one level
  - go home

Listing and searching:
  - list all files
  - show me what's in this directory
  - search for files named report
  - search for \"TODO\" in main.rs

System information:
  - show memory usage
  - how much disk space is left
  - what processes are running
  - how long has the system been up
  - what time is it

Sentences that start with a command name run as that command.
Use 'ai <sentence>' to see how a sentence is interpreted without running it.";

/// Matches utterances against an ordered rule list; the first hit wins.
#[derive(Debug, Clone, Copy)]
pub struct NlInterpreter {
    rules: &'static [Rule],
}

impl NlInterpreter {
    pub fn new() -> Self {
        Self::with_rules(RULES)
    }

    pub fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    pub fn interpret(&self, utterance: &str) -> InterpretationResult {
        let terms = normalize(utterance);
        if terms.is_empty() {
            return InterpretationResult::unmatched(utterance);
        }

        for rule in self.rules {
            for parts in rule.patterns {
                let Some(captures) = match_pattern(parts, &terms) else {
                    continue;
                };
                let Some(command) = render(rule.template, &captures) else {
                    debug!(rule = rule.id, "template names an uncaptured slot");
                    continue;
                };
                debug!(rule = rule.id, %command, "utterance matched");
                return InterpretationResult {
                    utterance: utterance.to_string(),
                    rule: Some(rule.id),
                    command: Some(command),
                    action: Some(rule.action),
                };
            }
        }

        debug!(utterance, "no rule matched");
        InterpretationResult::unmatched(utterance)
    }

    /// Example utterances containing `partial`, case-insensitively.
    ///
    /// An empty `partial` gives the first five examples; otherwise at most ten.
    pub fn suggestions(&self, partial: &str) -> Vec<&'static str> {
        let partial = partial.trim().to_lowercase();
        if partial.is_empty() {
            return EXAMPLES.iter().take(5).copied().collect();
        }
        EXAMPLES
            .iter()
            .filter(|example| example.to_lowercase().contains(&partial))
            .take(10)
            .copied()
            .collect()
    }

    pub fn capabilities(&self) -> &'static str {
        CAPABILITIES
    }
}

impl Default for NlInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interprets_documented_examples() {
        let nl = NlInterpreter::new();

        let result = nl.interpret("create a new file called example.txt");
        assert_eq!(result.command.as_deref(), Some("touch example.txt"));
        assert_eq!(result.action, Some("Create a new file"));
        assert_eq!(result.utterance, "create a new file called example.txt");

        assert_eq!(nl.interpret("where am I").command.as_deref(), Some("pwd"));
        assert_eq!(
            nl.interpret("copy file.txt to backup folder").command.as_deref(),
            Some("cp file.txt backup")
        );
    }

    #[test]
    fn unknown_utterance_has_no_command() {
        let nl = NlInterpreter::new();
        let result = nl.interpret("sing me a song about penguins");
        assert!(!result.matched());
        assert_eq!(result.rule, None);
        assert_eq!(result.action, None);
        assert!(!nl.interpret("   ").matched());
    }

    #[test]
    fn courtesy_and_punctuation_are_ignored() {
        let nl = NlInterpreter::new();
        assert_eq!(nl.interpret("Please, where am I?").command.as_deref(), Some("pwd"));
        assert_eq!(
            nl.interpret("Could you list all files, please.").command.as_deref(),
            Some("ls -la")
        );
    }

    #[test]
    fn captures_keep_case_and_are_quoted() {
        let nl = NlInterpreter::new();
        assert_eq!(
            nl.interpret("Create a file called \"My Notes.txt\"").command.as_deref(),
            Some("touch 'My Notes.txt'")
        );
    }

    #[test]
    fn examples_and_capabilities_are_understood() {
        let nl = NlInterpreter::new();
        for example in EXAMPLES {
            assert!(nl.interpret(example).matched(), "{example}");
        }
        for line in CAPABILITIES.lines() {
            if let Some(example) = line.trim().strip_prefix("- ") {
                assert!(nl.interpret(example).matched(), "{example}");
            }
        }
    }

    #[test]
    fn suggestions_filter_examples() {
        let nl = NlInterpreter::new();
        assert_eq!(nl.suggestions("").len(), 5);
        assert_eq!(nl.suggestions("disk"), vec!["show disk usage"]);
        assert_eq!(nl.suggestions("FILE.TXT").len(), 3);
        assert!(nl.suggestions("zebra").is_empty());
    }
}
