use crate::error::{Error, Result};

/// Raw statistics accumulated over a tagged corpus.
///
/// Tables are dense and indexed by tag id (`L` tags) and word id (`V` words):
/// - `start` is a `[L]` vector of sentence-initial tag counts.
/// - `trans` is a `[L][L]` matrix whose element `[i][j]` counts tag `i` followed by tag `j`.
/// - `emit` is a `[L][V]` matrix whose element `[i][w]` counts word `w` labeled with tag `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingCounts {
    num_tags: usize,
    num_words: usize,
    pub(crate) start: Vec<u64>,
    pub(crate) trans: Vec<u64>,
    pub(crate) emit: Vec<u64>,
    pub(crate) tag_totals: Vec<u64>,
    pub(crate) total_first_words: u64,
}

impl TrainingCounts {
    pub fn new(num_tags: usize, num_words: usize) -> Self {
        Self {
            num_tags,
            num_words,
            start: vec![0; num_tags],
            trans: vec![0; num_tags * num_tags],
            emit: vec![0; num_tags * num_words],
            tag_totals: vec![0; num_tags],
            total_first_words: 0,
        }
    }

    #[inline]
    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    #[inline]
    pub fn num_words(&self) -> usize {
        self.num_words
    }

    /// Adds one sentence given as `(word id, tag id)` pairs.
    ///
    /// Ids must be in range; callers validate them.
    #[allow(non_snake_case)]
    pub(crate) fn add_sentence(&mut self, seq: &[(usize, usize)]) {
        let Some(&(_, first)) = seq.first() else {
            return;
        };
        let L = self.num_tags;
        let V = self.num_words;
        self.start[first] += 1;
        self.total_first_words += 1;

        for pair in seq.windows(2) {
            self.trans[L * pair[0].1 + pair[1].1] += 1;
        }
        for &(w, t) in seq {
            self.emit[V * t + w] += 1;
            self.tag_totals[t] += 1;
        }
    }

    /// Adds another table of the same shape, element by element.
    pub fn merge(&mut self, other: &TrainingCounts) -> Result<()> {
        if (self.num_tags, self.num_words) != (other.num_tags, other.num_words) {
            return Err(Error::ShapeMismatch {
                expected: (self.num_tags, self.num_words),
                actual: (other.num_tags, other.num_words),
            });
        }
        fn add(dst: &mut [u64], src: &[u64]) {
            dst.iter_mut().zip(src).for_each(|(d, s)| *d += s);
        }
        add(&mut self.start, &other.start);
        add(&mut self.trans, &other.trans);
        add(&mut self.emit, &other.emit);
        add(&mut self.tag_totals, &other.tag_totals);
        self.total_first_words += other.total_first_words;
        Ok(())
    }

    /// Sentence-initial count of `tag`, `None` for an id outside the table.
    pub fn start_count(&self, tag: usize) -> Option<u64> {
        self.start.get(tag).copied()
    }

    pub fn trans_count(&self, from: usize, to: usize) -> Option<u64> {
        self.trans_row(from)?.get(to).copied()
    }

    pub fn emit_count(&self, tag: usize, word: usize) -> Option<u64> {
        self.emit_row(tag)?.get(word).copied()
    }

    pub fn tag_total(&self, tag: usize) -> Option<u64> {
        self.tag_totals.get(tag).copied()
    }

    pub fn total_first_words(&self) -> u64 {
        self.total_first_words
    }

    /// Sum of the outgoing transitions of `tag`.
    pub fn trans_total(&self, tag: usize) -> Option<u64> {
        self.trans_row(tag).map(|row| row.iter().sum())
    }

    #[allow(non_snake_case)]
    pub fn trans_row(&self, tag: usize) -> Option<&[u64]> {
        let L = self.num_tags;
        if tag >= L {
            return None;
        }
        Some(&self.trans[L * tag..L * (tag + 1)])
    }

    #[allow(non_snake_case)]
    pub fn emit_row(&self, tag: usize) -> Option<&[u64]> {
        let V = self.num_words;
        if tag >= self.num_tags {
            return None;
        }
        Some(&self.emit[V * tag..V * (tag + 1)])
    }

    pub fn is_empty(&self) -> bool {
        self.total_first_words == 0
    }
}
