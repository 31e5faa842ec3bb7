use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    hmm::{
        counts::TrainingCounts,
        model::ProbabilityModel,
        vocab::{Vocabulary, WordFreq},
    },
    tag::{Tag, TagSet},
};

/// Hyperparameters of the estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Words seen at most this many times are folded into the OOV sentinel.
    pub min_freq: u64,
    /// Additive smoothing constant; 1.0 is Laplace smoothing.
    pub alpha: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self { min_freq: 0, alpha: 1.0 }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "alpha must be a positive number, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Accumulates HMM statistics sentence by sentence and derives smoothed
/// probabilities from them.
#[derive(Debug, Clone)]
pub struct ParameterEstimator {
    tags: TagSet,
    vocab: Vocabulary,
    alpha: f64,
    counts: TrainingCounts,
}

impl ParameterEstimator {
    /// Creates an estimator over a closed tag set and vocabulary.
    pub fn new(tags: TagSet, vocab: Vocabulary, config: &TrainerConfig) -> Result<Self> {
        config.validate()?;
        if tags.is_empty() {
            return Err(Error::InvalidConfig("empty tag set".into()));
        }
        let counts = TrainingCounts::new(tags.len(), vocab.len());
        Ok(Self { tags, vocab, alpha: config.alpha, counts })
    }

    /// Two-pass training over a whole corpus.
    ///
    /// The first pass counts raw word frequencies to build the vocabulary
    /// (words at or below `min_freq` fold into OOV), the second one trains.
    /// Sentences carrying a tag outside `tags` are skipped and counted.
    pub fn fit<S, W>(tags: TagSet, corpus: &[S], config: &TrainerConfig) -> Result<Self>
    where
        S: AsRef<[(W, Tag)]> + Sync,
        W: AsRef<str> + Sync,
    {
        let begin = Instant::now();
        let mut freq = WordFreq::default();
        for sent in corpus {
            for (w, _) in sent.as_ref() {
                freq.add(w.as_ref());
            }
        }
        let vocab = Vocabulary::from_frequencies(&freq, config.min_freq);
        log::info!(
            "vocabulary (distinct: {}, kept: {}, min_freq: {})",
            freq.len(),
            vocab.len(),
            config.min_freq
        );
        log::debug!("frequency pass took {:?}", begin.elapsed());

        let mut this = Self::new(tags, vocab, config)?;
        let begin = Instant::now();
        let skipped = this.train_corpus(corpus)?;
        if skipped > 0 {
            log::warn!("{skipped} sentences skipped: tag outside the tag set");
        }
        log::info!(
            "trained on {} sentences (tags: {}, words: {}), time cost: {:?}",
            this.counts.total_first_words(),
            this.tags.len(),
            this.vocab.len(),
            begin.elapsed()
        );
        Ok(this)
    }

    #[cfg(not(feature = "parallel"))]
    fn train_corpus<S, W>(&mut self, corpus: &[S]) -> Result<usize>
    where
        S: AsRef<[(W, Tag)]> + Sync,
        W: AsRef<str> + Sync,
    {
        let mut skipped = 0;
        for sent in corpus {
            if let Err(e) = self.try_train(sent.as_ref()) {
                log::debug!("sentence skipped: {e}");
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    #[cfg(feature = "parallel")]
    fn train_corpus<S, W>(&mut self, corpus: &[S]) -> Result<usize>
    where
        S: AsRef<[(W, Tag)]> + Sync,
        W: AsRef<str> + Sync,
    {
        use rayon::prelude::*;

        const CHUNK_SIZE: usize = 1024;
        let partials = corpus
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| {
                let mut counts = TrainingCounts::new(self.tags.len(), self.vocab.len());
                let mut skipped = 0;
                for sent in chunk {
                    match self.encode(sent.as_ref()) {
                        Ok(seq) => counts.add_sentence(&seq),
                        Err(e) => {
                            log::debug!("sentence skipped: {e}");
                            skipped += 1;
                        }
                    }
                }
                (counts, skipped)
            })
            .collect::<Vec<_>>();
        log::debug!("merging {} partial count tables", partials.len());
        let mut skipped = 0;
        for (partial, n) in &partials {
            self.counts.merge(partial)?;
            skipped += n;
        }
        Ok(skipped)
    }

    fn encode<W: AsRef<str>>(&self, sentence: &[(W, Tag)]) -> Result<Vec<(usize, usize)>> {
        sentence
            .iter()
            .map(|(w, t)| {
                let tid = self.tags.id(*t).ok_or_else(|| Error::missing_tag(t))?;
                Ok((self.vocab.lookup(w.as_ref()), tid))
            })
            .collect()
    }

    /// Adds one tagged sentence to the counts.
    ///
    /// An empty sentence is a no-op. A sentence carrying a tag outside the
    /// estimator's tag set is rejected as a whole and leaves the counts unchanged.
    pub fn try_train<W: AsRef<str>>(&mut self, sentence: &[(W, Tag)]) -> Result<()> {
        let seq = self.encode(sentence)?;
        self.counts.add_sentence(&seq);
        Ok(())
    }

    /// Same as [`Self::try_train`] for callers that guarantee every tag belongs to
    /// the tag set; sentences violating that are skipped with a warning.
    pub fn train<W: AsRef<str>>(&mut self, sentence: &[(W, Tag)]) {
        if let Err(e) = self.try_train(sentence) {
            log::warn!("sentence skipped: {e}");
        }
    }

    /// Adds counts accumulated elsewhere over the same tag set and vocabulary.
    pub fn merge(&mut self, counts: &TrainingCounts) -> Result<()> {
        self.counts.merge(counts)
    }

    pub fn counts(&self) -> &TrainingCounts {
        &self.counts
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Converts the counts to additively smoothed probabilities.
    ///
    /// ```text
    /// start[t]    = (start[t] + a)    / (sentences      + a * L)
    /// trans[i][j] = (trans[i][j] + a) / (sum_k trans[i][k] + a * L)
    /// emit[t][w]  = (emit[t][w] + a)  / (tag_totals[t]  + a * V)
    /// ```
    /// `V` counts the OOV sentinel, so every row sums to one.
    #[allow(non_snake_case)]
    pub fn derive(&self) -> ProbabilityModel {
        let c = &self.counts;
        let a = self.alpha;
        let L = c.num_tags();
        let V = c.num_words();

        let denom = c.total_first_words() as f64 + a * L as f64;
        let start = c.start.iter().map(|&n| (n as f64 + a) / denom).collect();

        let mut trans = Vec::with_capacity(L * L);
        for row in c.trans.chunks(L) {
            let denom = row.iter().sum::<u64>() as f64 + a * L as f64;
            trans.extend(row.iter().map(|&n| (n as f64 + a) / denom));
        }

        let mut emit = Vec::with_capacity(L * V);
        for (row, &total) in c.emit.chunks(V).zip(&c.tag_totals) {
            let denom = total as f64 + a * V as f64;
            emit.extend(row.iter().map(|&n| (n as f64 + a) / denom));
        }

        ProbabilityModel::from_parts(self.tags.clone(), self.vocab.clone(), start, trans, emit)
    }
}
