use crate::{
    error::{Error, Result},
    hmm::{context::Trellis, model::{ProbabilityModel, PROB_FLOOR}},
    tag::Tag,
};

/// Viterbi decoder over a [`ProbabilityModel`].
///
/// Log tables are computed once in [`Tagger::new`]; each call to
/// [`Tagger::tag`] allocates its own trellis, so one tagger can be shared
/// between threads.
#[derive(Debug)]
pub struct Tagger<'a> {
    model: &'a ProbabilityModel,
    log_start: Vec<f64>,
    log_trans: Vec<f64>,
    log_emit: Vec<f64>,
}

#[inline]
fn ln_floor(p: f64) -> f64 {
    if p.is_finite() && p > 0.0 {
        p.ln()
    } else {
        PROB_FLOOR.ln()
    }
}

impl<'a> Tagger<'a> {
    pub fn new(model: &'a ProbabilityModel) -> Self {
        Self {
            model,
            log_start: model.start.iter().copied().map(ln_floor).collect(),
            log_trans: model.trans.iter().copied().map(ln_floor).collect(),
            log_emit: model.emit.iter().copied().map(ln_floor).collect(),
        }
    }

    pub fn model(&self) -> &ProbabilityModel {
        self.model
    }

    #[allow(non_snake_case)]
    fn set_seq<S: AsRef<str>>(&self, tokens: &[S]) -> Trellis {
        let L = self.model.num_tags();
        let V = self.model.num_words();
        let vocab = self.model.vocabulary();
        let mut ctx = Trellis::new(L, tokens.len());
        for (t, token) in tokens.iter().enumerate() {
            let w = vocab.lookup(token.as_ref());
            for l in 0..L {
                ctx.state[L * t + l] = self.log_emit[V * l + w];
            }
        }
        ctx
    }

    /// Most probable tag sequence and its natural-log probability.
    pub fn tag_with_score<S: AsRef<str>>(&self, tokens: &[S]) -> Result<(Vec<Tag>, f64)> {
        if tokens.is_empty() {
            return Err(Error::InvalidInput("empty token sequence".into()));
        }
        let mut ctx = self.set_seq(tokens);
        let mut labels = vec![0; ctx.num_items()];
        let score = ctx.viterbi(&self.log_start, &self.log_trans, &mut labels);
        let tags = labels
            .into_iter()
            .map(|l| self.model.tags().get(l).ok_or_else(|| Error::MissingParameter(format!("tag id {l}"))))
            .collect::<Result<Vec<_>>>()?;
        Ok((tags, score))
    }

    /// Most probable tag sequence, one tag per token.
    pub fn tag<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<Tag>> {
        self.tag_with_score(tokens).map(|(tags, _)| tags)
    }

    /// Tags every sentence independently. Fails on the first empty sentence.
    pub fn tag_sentences<T, S>(&self, sentences: &[T]) -> Result<Vec<Vec<Tag>>>
    where
        T: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            sentences.par_iter().map(|s| self.tag(s.as_ref())).collect()
        }
        #[cfg(not(feature = "parallel"))]
        sentences.iter().map(|s| self.tag(s.as_ref())).collect()
    }
}

/// Decodes one sentence with a throwaway [`Tagger`].
pub fn decode<S: AsRef<str>>(tokens: &[S], model: &ProbabilityModel) -> Result<Vec<Tag>> {
    Tagger::new(model).tag(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hmm::vocab::Vocabulary, tag::TagSet};

    /// NOUN emits "a", VERB emits "b", NOUN -> VERB is likely.
    fn model() -> ProbabilityModel {
        ProbabilityModel::from_parts(
            TagSet::new(&[Tag::Noun, Tag::Verb]),
            Vocabulary::from_words(["a", "b"]),
            vec![0.6, 0.4],
            vec![0.2, 0.8, 0.7, 0.3],
            vec![0.1, 0.8, 0.1, 0.1, 0.1, 0.8],
        )
    }

    #[test]
    fn tag_simple() {
        let m = model();
        let tagger = Tagger::new(&m);
        assert_eq!(tagger.tag(&["a", "b"]).unwrap(), vec![Tag::Noun, Tag::Verb]);
        assert_eq!(tagger.tag(&["b", "a", "b"]).unwrap(), vec![Tag::Verb, Tag::Noun, Tag::Verb]);
        assert_eq!(decode(&["a"], &m).unwrap(), vec![Tag::Noun]);
    }

    #[test]
    fn score_is_path_log_probability() {
        let m = model();
        let (tags, score) = Tagger::new(&m).tag_with_score(&["a", "b"]).unwrap();
        assert_eq!(tags, vec![Tag::Noun, Tag::Verb]);
        let expected = (0.6f64 * 0.8 * 0.8 * 0.8).ln();
        assert!((score - expected).abs() < 1e-12, "{score} != {expected}");
    }

    #[test]
    fn empty_input() {
        let m = model();
        let empty: [&str; 0] = [];
        assert!(matches!(decode(&empty, &m), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn unknown_words_use_oov_column() {
        let m = model();
        let tagger = Tagger::new(&m);
        // OOV column is flat, so start probabilities decide
        assert_eq!(tagger.tag(&["zzz"]).unwrap(), vec![Tag::Noun]);
        assert_eq!(tagger.tag(&["a", "zzz"]).unwrap(), vec![Tag::Noun, Tag::Verb]);
    }

    #[test]
    fn zero_probabilities_are_floored() {
        let m = ProbabilityModel::from_parts(
            TagSet::new(&[Tag::Noun, Tag::Verb]),
            Vocabulary::from_words(["a", "b"]),
            vec![1.0, 0.0],
            vec![0.0, 1.0, 1.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        );
        let (tags, score) = Tagger::new(&m).tag_with_score(&["a", "b", "b"]).unwrap();
        assert_eq!(tags.len(), 3);
        assert!(score.is_finite());
        assert_eq!(&tags[..2], &[Tag::Noun, Tag::Verb]);
    }

    #[test]
    fn many_sentences() {
        let m = model();
        let sents = vec![vec!["a", "b"], vec!["b"]];
        let tags = Tagger::new(&m).tag_sentences(&sents).unwrap();
        assert_eq!(tags, vec![vec![Tag::Noun, Tag::Verb], vec![Tag::Verb]]);

        let with_empty: Vec<Vec<&str>> = vec![vec!["a"], vec![]];
        assert!(Tagger::new(&m).tag_sentences(&with_empty).is_err());
    }
}
