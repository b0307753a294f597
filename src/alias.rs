//! Alias table and first-word alias resolution.

use crate::error::ShellError;
use crate::lexer::Token;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// A registered alias: `name` expands to `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub name: String,
    /// Replacement words, tokenized when the alias was defined.
    pub replacement: Vec<Token>,
    /// The value as the user wrote it, for listing.
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, AliasEntry>,
}

impl AliasTable {
    /// Registers or replaces an alias.
    pub fn define(&mut self, name: impl Into<String>, source: impl Into<String>, replacement: Vec<Token>) {
        let name = name.into();
        self.entries.insert(
            name.clone(),
            AliasEntry {
                name,
                replacement,
                source: source.into(),
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> Option<AliasEntry> {
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, name: &str) -> Option<&AliasEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.values()
    }
}

/// Expands an alias on the first token, repeatedly.
///
/// Only an unquoted first token is looked up. Each alias expands at most once
/// per call, so at most `table.len()` expansions happen; meeting an alias a
/// second time fails with [`ShellError::AliasCycle`] naming the alias the
/// resolution started from.
pub fn resolve(mut tokens: Vec<Token>, table: &AliasTable) -> Result<Vec<Token>, ShellError> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut started_from: Option<String> = None;

    loop {
        let entry = match tokens.first() {
            Some(first) if !first.is_quoted() => match table.get(&first.text) {
                Some(entry) => entry,
                None => break,
            },
            _ => break,
        };

        let start = started_from.get_or_insert_with(|| entry.name.clone());
        if visited.contains(&entry.name) || visited.len() >= table.len() {
            return Err(ShellError::AliasCycle {
                name: start.clone(),
            });
        }
        visited.insert(entry.name.clone());

        debug!(alias = %entry.name, replacement = %entry.source, "expanding alias");
        tokens.splice(0..1, entry.replacement.iter().cloned());
    }

    Ok(tokens)
}
