use std::collections::HashMap;

use crate::quark::{Quark, StringTable, TextVectorizer};

/// Sentinel standing in for every word outside the closed vocabulary.
pub const OOV: &str = "<UNK>";

/// Id of [`OOV`] in every vocabulary.
pub const OOV_ID: usize = 0;

/// Raw word frequencies collected by the first training pass.
///
/// Insertion order is kept so the vocabulary built from it is deterministic.
#[derive(Debug, Default, Clone)]
pub struct WordFreq {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl WordFreq {
    pub fn add(&mut self, word: &str) {
        match self.counts.get_mut(word) {
            Some(c) => *c += 1,
            None => {
                self.counts.insert(word.to_string(), 1);
                self.order.push(word.to_string());
            }
        }
    }

    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order.iter().map(|w| (w.as_str(), self.counts[w]))
    }
}

/// Closed set of known word forms. Always contains [`OOV`] at [`OOV_ID`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Quark,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut words = Quark::default();
        words.find_or_insert(OOV);
        Self { words }
    }
}

impl Vocabulary {
    /// Keeps the words seen strictly more than `min_freq` times; the rest fold into [`OOV`].
    pub fn from_frequencies(freq: &WordFreq, min_freq: u64) -> Self {
        let mut this = Self::default();
        for (word, n) in freq.iter() {
            if n > min_freq {
                this.words.find_or_insert(word);
            }
        }
        this
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut this = Self::default();
        for w in words {
            this.words.find_or_insert(w.as_ref());
        }
        this
    }

    /// Maps a word to its id, unknown words to [`OOV_ID`].
    #[inline]
    pub fn lookup(&self, word: &str) -> usize {
        self.words.to_id(word).unwrap_or(OOV_ID)
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.to_id(word).is_some()
    }

    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.to_str(id)
    }

    /// Number of entries, the sentinel included.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter()
    }
}
