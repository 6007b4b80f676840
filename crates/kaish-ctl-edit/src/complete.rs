//! Candidate generation, filtering, and common-prefix insertion.
//!
//! File and external-command generation are the only generators that
//! touch the filesystem/`PATH`; the rest (builtin, function, keyword,
//! alias, variable, job, signal, user/group/host, binding) are fed
//! candidate lists by their owning collaborator
//! and simply filtered/sorted here.

use std::path::Path;

/// How the source word is quoted.
/// `None` here is the unquoted state, distinct from `Option<QuoteState>`
/// — there is always exactly one quote state, just as there is always
/// exactly one word being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    /// Unquoted; if the run so far contains a backslash-escaped
    /// character, re-insertion must not double-escape it.
    None,
    Single,
    Double,
}

/// Syntactic classification of the cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Command,
    Argument,
    Redirection,
    RedirectionFd,
    Variable,
    Tilde,
    Arithmetic,
    Assignment,
    ForIn,
    ForDo,
    CaseIn,
    Function,
    KeywordSlot,
}

/// The classified cursor position, source word, and preceding words.
#[derive(Debug, Clone)]
pub struct CompletionContext {
    pub word: String,
    pub word_start: usize,
    pub quote: QuoteState,
    pub classification: Classification,
    pub preceding_words: Vec<String>,
}

impl CompletionContext {
    /// A simplified classifier: the parser collaborator would normally supply this; this heuristic covers the
    /// common cases from a raw prefix so the engine is usable standalone.
    pub fn classify(line: &str, cursor: usize) -> Self {
        let prefix = &line[..cursor.min(line.len())];
        let mut quote = QuoteState::None;
        let mut escaped = false;
        for c in prefix.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if quote != QuoteState::Single => escaped = true,
                '\'' if quote == QuoteState::None => quote = QuoteState::Single,
                '\'' if quote == QuoteState::Single => quote = QuoteState::None,
                '"' if quote == QuoteState::None => quote = QuoteState::Double,
                '"' if quote == QuoteState::Double => quote = QuoteState::None,
                _ => {}
            }
        }

        let mut words: Vec<&str> = prefix.split_whitespace().collect();
        let word_is_open = !prefix.ends_with(char::is_whitespace) && !prefix.is_empty();
        let word = if word_is_open { words.pop().unwrap_or("") } else { "" };
        let word_start = cursor - word.chars().count();

        let classification = if word.starts_with('~') {
            Classification::Tilde
        } else if word.starts_with('$') {
            Classification::Variable
        } else if word.starts_with('>') || word.starts_with('<') {
            Classification::Redirection
        } else if words.is_empty() {
            Classification::Command
        } else {
            Classification::Argument
        };

        Self {
            word: word.to_string(),
            word_start,
            quote,
            classification,
            preceding_words: words.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Category of a completion source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    File,
    Word,
    Command,
    Alias,
    Option,
    Variable,
    Job,
    Signal,
    User,
    Group,
    Host,
    Binding,
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    /// Value before any `-P`/`-S` prefix/suffix is applied.
    pub origin: String,
    pub display: String,
    pub description: Option<String>,
    pub category: Category,
    pub file_stat: Option<String>,
    /// Whether accepting this candidate appends a terminator.
    pub terminate: bool,
}

impl CompletionCandidate {
    pub fn simple(value: impl Into<String>, category: Category) -> Self {
        let value = value.into();
        Self {
            display: value.clone(),
            origin: value,
            description: None,
            category,
            file_stat: None,
            terminate: true,
        }
    }
}

/// Generates file candidates for `word` inside `dir` ( step
/// 3 "file (via glob)"), using `ignore` for gitignore-aware directory
/// walking restricted to a single level.
pub fn generate_files(dir: &Path, prefix: &str) -> Vec<CompletionCandidate> {
    let mut out = Vec::new();
    let mut builder = ignore::WalkBuilder::new(dir);
    builder.max_depth(Some(1)).hidden(!prefix.starts_with('.'));
    for entry in builder.build().flatten() {
        if entry.path() == dir {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.starts_with(prefix) {
            continue;
        }
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        let mut cand = CompletionCandidate::simple(name, Category::File);
        if is_dir {
            cand.display = format!("{name}/");
            cand.terminate = false;
        }
        out.push(cand);
    }
    out
}

/// Walks `PATH` directories for external-command candidates matching
/// `prefix`, excluding slash-bearing words step 2
/// defaults.
pub fn generate_external_commands(path_env: &str, prefix: &str) -> Vec<CompletionCandidate> {
    if prefix.contains('/') {
        return Vec::new();
    }
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::new();
    for dir in std::env::split_paths(path_env) {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !name.starts_with(prefix) || !seen.insert(name.clone()) {
                continue;
            }
            out.push(CompletionCandidate::simple(name, Category::Command));
        }
    }
    out
}

/// Filters a pre-supplied candidate list by prefix — the shape shared by
/// builtin/function/keyword/alias/variable/job/signal/user/group/
/// host/binding generators, all of which are fed their raw word list by
/// the owning collaborator.
pub fn filter_prefix(words: &[&str], prefix: &str, category: Category) -> Vec<CompletionCandidate> {
    words
        .iter()
        .filter(|w| w.starts_with(prefix))
        .map(|w| CompletionCandidate::simple(*w, category))
        .collect()
}

/// An accept/reject pattern chain supplied by a per-command completion
/// script.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    accept: Vec<String>,
    reject: Vec<String>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(mut self, pattern: impl Into<String>) -> Self {
        self.accept.push(pattern.into());
        self
    }

    pub fn reject(mut self, pattern: impl Into<String>) -> Self {
        self.reject.push(pattern.into());
        self
    }

    pub fn keep(&self, candidate: &CompletionCandidate) -> bool {
        let accepted = self.accept.is_empty()
            || self
                .accept
                .iter()
                .any(|p| crate::history::glob_match_pub(p, &candidate.origin));
        let rejected = self
            .reject
            .iter()
            .any(|p| crate::history::glob_match_pub(p, &candidate.origin));
        accepted && !rejected
    }
}

/// Sorts candidates step 4: case-sensitive (locale)
/// order, except hyphen-prefixed candidates are grouped together and
/// sorted case-insensitively so short options precede long options of
/// the same name; adjacent equal entries are then deduplicated.
pub fn sort_and_dedup(candidates: &mut Vec<CompletionCandidate>) {
    candidates.sort_by(|a, b| {
        let a_opt = a.origin.starts_with('-');
        let b_opt = b.origin.starts_with('-');
        match (a_opt, b_opt) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (true, true) => a
                .origin
                .to_lowercase()
                .cmp(&b.origin.to_lowercase())
                .then_with(|| a.origin.len().cmp(&b.origin.len())),
            (false, false) => a.origin.cmp(&b.origin),
        }
    });
    candidates.dedup_by(|a, b| a.origin == b.origin);
}

/// Longest common prefix across candidate origin values.
pub fn common_prefix(candidates: &[CompletionCandidate]) -> String {
    let mut iter = candidates.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.origin.chars().collect();
    for cand in iter {
        let chars: Vec<char> = cand.origin.chars().collect();
        let common_len = prefix
            .iter()
            .zip(chars.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(common_len);
        if prefix.is_empty() {
            break;
        }
    }
    prefix.into_iter().collect()
}

/// Quotes `text` for re-insertion per the detected quote state.
pub fn quote_insert(text: &str, quote: QuoteState) -> String {
    match quote {
        QuoteState::Single => text.replace('\'', r"'\''"),
        QuoteState::Double => text
            .chars()
            .flat_map(|c| {
                if matches!(c, '"' | '\\' | '$' | '`') {
                    vec!['\\', c]
                } else {
                    vec![c]
                }
            })
            .collect(),
        QuoteState::None => text
            .chars()
            .flat_map(|c| {
                if " \t\n'\"\\$`|&;()<>*?[]~".contains(c) {
                    vec!['\\', c]
                } else {
                    vec![c]
                }
            })
            .collect(),
    }
}

/// Drives the full generate → filter → sort → insert pipeline.
#[derive(Debug, Default)]
pub struct CompletionEngine;

impl CompletionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes the text to insert and whether a list should be shown.
    /// Returns `(insertion, candidates)`: if `candidates.len() == 1` the
    /// caller should replace the source word outright and, unless the
    /// sole candidate opted out, append its terminator; otherwise the
    /// caller inserts `insertion` (the common prefix) and displays the
    /// list.
    pub fn resolve(
        &self,
        mut candidates: Vec<CompletionCandidate>,
        filters: &FilterChain,
        quote: QuoteState,
    ) -> (String, Vec<CompletionCandidate>) {
        candidates.retain(|c| filters.keep(c));
        sort_and_dedup(&mut candidates);

        if candidates.len() == 1 {
            let mut text = quote_insert(&candidates[0].origin, quote);
            if candidates[0].terminate {
                text.push(' ');
            }
            return (text, candidates);
        }

        let prefix = common_prefix(&candidates);
        (quote_insert(&prefix, quote), candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(s: &str) -> CompletionCandidate {
        CompletionCandidate::simple(s, Category::File)
    }

    #[test]
    fn common_prefix_of_alpha_candidates() {
        let candidates = vec![cand("alpha1"), cand("alpha2"), cand("beta")];
        assert_eq!(common_prefix(&candidates[..2]), "alpha");
    }

    #[test]
    fn hyphen_candidates_sort_case_insensitively_before_others() {
        let mut candidates = vec![cand("zeta"), cand("-Verbose"), cand("-a"), cand("alpha")];
        sort_and_dedup(&mut candidates);
        let origins: Vec<_> = candidates.iter().map(|c| c.origin.as_str()).collect();
        assert_eq!(origins, vec!["-a", "-Verbose", "alpha", "zeta"]);
    }

    #[test]
    fn dedup_removes_adjacent_equal_entries() {
        let mut candidates = vec![cand("a"), cand("a"), cand("b")];
        sort_and_dedup(&mut candidates);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn single_candidate_terminates_with_space() {
        let engine = CompletionEngine::new();
        let candidates = vec![cand("alpha")];
        let (text, remaining) = engine.resolve(candidates, &FilterChain::new(), QuoteState::None);
        assert_eq!(text, "alpha ");
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn multiple_candidates_insert_common_prefix_only() {
        let engine = CompletionEngine::new();
        let candidates = vec![cand("alpha1"), cand("alpha2")];
        let (text, remaining) = engine.resolve(candidates, &FilterChain::new(), QuoteState::None);
        assert_eq!(text, "alpha");
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn single_quoting_escapes_internal_apostrophes() {
        assert_eq!(quote_insert("it's", QuoteState::Single), r"it'\''s");
    }
}
