//! The spelling oracle interface.
//!
//! The oracle is the external backend that knows whether a word is spelled
//! correctly. The checker talks to it through a pull-based session: after
//! `begin_check` the oracle produces zero or more `Misspelling` events
//! followed by `Finished`, and `next_event` returning `None` means the
//! backend is still working. Cancellation discards whatever the session had
//! left to say.

use std::collections::{HashMap, HashSet, VecDeque};

use smol_str::SmolStr;
use thiserror::Error;

use crate::boundary::word_segments;

/// Errors surfaced by the spelling backend.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OracleError {
    /// The requested dictionary is not installed.
    #[error("dictionary not found: {0}")]
    DictionaryNotFound(String),

    /// The backend failed; the checker treats the affected text as correct.
    #[error("spelling backend error: {0}")]
    Backend(String),
}

/// One event from an active check session. `offset` is the char offset of
/// the word within the submitted text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OracleEvent {
    Misspelling { word: SmolStr, offset: usize },
    Finished,
}

/// Asynchronous word-checking backend, one session at a time.
pub trait SpellOracle {
    /// Select the dictionary used by subsequent checks.
    fn set_dictionary(&mut self, name: &str) -> Result<(), OracleError>;

    /// Start checking `text`. Any previous session is implicitly discarded.
    fn begin_check(&mut self, text: &str) -> Result<(), OracleError>;

    /// Pull the next session event. `None` means still pending.
    fn next_event(&mut self) -> Option<OracleEvent>;

    /// Abort the active session; pending events are dropped.
    fn cancel(&mut self);

    /// Permanently accept `word` in the active dictionary.
    fn add_word_to_dictionary(&mut self, word: &str);

    /// Accept `word` for the rest of this editing session.
    fn add_word_to_session(&mut self, word: &str);
}

/// Word-list backed oracle.
///
/// Holds named dictionaries as plain word sets and answers immediately:
/// events for the whole text are queued during `begin_check`. Tokenization
/// matches the default boundary resolver, so offsets line up with what the
/// checker expects. Suitable for tests and as a fallback backend.
#[derive(Default)]
pub struct WordListOracle {
    dictionaries: HashMap<SmolStr, HashSet<SmolStr>>,
    session_words: HashSet<SmolStr>,
    active: SmolStr,
    pending: VecDeque<OracleEvent>,
}

impl WordListOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a single dictionary, selected as active.
    pub fn with_dictionary<'a>(name: &str, words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut oracle = Self::new();
        oracle.add_dictionary(name, words);
        oracle.active = SmolStr::new(name);
        oracle
    }

    pub fn add_dictionary<'a>(&mut self, name: &str, words: impl IntoIterator<Item = &'a str>) {
        self.dictionaries
            .entry(SmolStr::new(name))
            .or_default()
            .extend(words.into_iter().map(SmolStr::new));
    }

    fn is_correct(&self, word: &str) -> bool {
        // Words with digits are not spelling material.
        if word.chars().any(|c| c.is_numeric()) {
            return true;
        }
        if self.session_words.contains(word) {
            return true;
        }
        let Some(dict) = self.dictionaries.get(&self.active) else {
            return true;
        };
        dict.contains(word) || dict.contains(word.to_lowercase().as_str())
    }
}

impl SpellOracle for WordListOracle {
    fn set_dictionary(&mut self, name: &str) -> Result<(), OracleError> {
        if !self.dictionaries.contains_key(name) {
            return Err(OracleError::DictionaryNotFound(name.to_string()));
        }
        self.active = SmolStr::new(name);
        Ok(())
    }

    fn begin_check(&mut self, text: &str) -> Result<(), OracleError> {
        self.pending.clear();
        let mut offset = 0usize;
        for line in text.split('\n') {
            for (start, end) in word_segments(line) {
                let word: String = line
                    .chars()
                    .skip(start as usize)
                    .take((end - start) as usize)
                    .collect();
                if !self.is_correct(&word) {
                    self.pending.push_back(OracleEvent::Misspelling {
                        word: SmolStr::new(&word),
                        offset: offset + start as usize,
                    });
                }
            }
            offset += line.chars().count() + 1;
        }
        self.pending.push_back(OracleEvent::Finished);
        Ok(())
    }

    fn next_event(&mut self) -> Option<OracleEvent> {
        self.pending.pop_front()
    }

    fn cancel(&mut self) {
        self.pending.clear();
    }

    fn add_word_to_dictionary(&mut self, word: &str) {
        self.dictionaries
            .entry(self.active.clone())
            .or_default()
            .insert(SmolStr::new(word));
    }

    fn add_word_to_session(&mut self, word: &str) {
        self.session_words.insert(SmolStr::new(word));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(oracle: &mut WordListOracle) -> Vec<OracleEvent> {
        std::iter::from_fn(|| oracle.next_event()).collect()
    }

    #[test]
    fn test_reports_unknown_words_with_offsets() {
        let mut oracle = WordListOracle::with_dictionary("en_US", ["say", "hello"]);
        oracle.begin_check("say Helllo").unwrap();

        let events = drain(&mut oracle);
        assert_eq!(
            events,
            vec![
                OracleEvent::Misspelling {
                    word: "Helllo".into(),
                    offset: 4
                },
                OracleEvent::Finished,
            ]
        );
    }

    #[test]
    fn test_case_falls_back_to_lowercase() {
        let mut oracle = WordListOracle::with_dictionary("en_US", ["hello"]);
        oracle.begin_check("Hello").unwrap();
        assert_eq!(drain(&mut oracle), vec![OracleEvent::Finished]);
    }

    #[test]
    fn test_multiline_offsets() {
        let mut oracle = WordListOracle::with_dictionary("en_US", ["one", "two"]);
        oracle.begin_check("one\ntow").unwrap();

        assert_eq!(
            drain(&mut oracle),
            vec![
                OracleEvent::Misspelling {
                    word: "tow".into(),
                    offset: 4
                },
                OracleEvent::Finished,
            ]
        );
    }

    #[test]
    fn test_session_words_accepted() {
        let mut oracle = WordListOracle::with_dictionary("en_US", []);
        oracle.add_word_to_session("xyzzy");
        oracle.begin_check("xyzzy").unwrap();
        assert_eq!(drain(&mut oracle), vec![OracleEvent::Finished]);
    }

    #[test]
    fn test_unknown_dictionary_rejected() {
        let mut oracle = WordListOracle::with_dictionary("en_US", []);
        assert!(matches!(
            oracle.set_dictionary("tlh"),
            Err(OracleError::DictionaryNotFound(_))
        ));
        assert!(oracle.set_dictionary("en_US").is_ok());
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut oracle = WordListOracle::with_dictionary("en_US", []);
        oracle.begin_check("wrold").unwrap();
        oracle.cancel();
        assert_eq!(oracle.next_event(), None);
    }

    #[test]
    fn test_numbers_ignored() {
        let mut oracle = WordListOracle::with_dictionary("en_US", []);
        oracle.begin_check("3rd x86").unwrap();
        assert_eq!(drain(&mut oracle), vec![OracleEvent::Finished]);
    }
}
