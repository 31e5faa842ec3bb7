use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    hmm::vocab::{Vocabulary, OOV},
    tag::{Tag, TagSet},
};

/// Value substituted for probabilities a loaded document lacks or gets wrong.
pub const PROB_FLOOR: f64 = 1e-6;

/// Smoothed HMM parameters.
///
/// `start` is `[L]`, `trans` is `[L][L]` (row = previous tag) and `emit` is
/// `[L][V]` (row = tag, column = word id, the OOV sentinel included).
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityModel {
    tags: TagSet,
    vocab: Vocabulary,
    pub(crate) start: Vec<f64>,
    pub(crate) trans: Vec<f64>,
    pub(crate) emit: Vec<f64>,
}

/// Language-neutral JSON layout of a [`ProbabilityModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub states: Vec<String>,
    pub observations: Vec<String>,
    pub start_prob: BTreeMap<String, f64>,
    pub trans_prob: BTreeMap<String, BTreeMap<String, f64>>,
    pub emit_prob: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ProbabilityModel {
    pub(crate) fn from_parts(
        tags: TagSet,
        vocab: Vocabulary,
        start: Vec<f64>,
        trans: Vec<f64>,
        emit: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(start.len(), tags.len());
        debug_assert_eq!(trans.len(), tags.len() * tags.len());
        debug_assert_eq!(emit.len(), tags.len() * vocab.len());
        Self { tags, vocab, start, trans, emit }
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    #[inline]
    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn num_words(&self) -> usize {
        self.vocab.len()
    }

    fn tag_id(&self, tag: Tag) -> Result<usize> {
        self.tags.id(tag).ok_or_else(|| Error::missing_tag(tag))
    }

    pub fn start_prob(&self, tag: Tag) -> Result<f64> {
        Ok(self.start[self.tag_id(tag)?])
    }

    pub fn trans_prob(&self, from: Tag, to: Tag) -> Result<f64> {
        let (i, j) = (self.tag_id(from)?, self.tag_id(to)?);
        Ok(self.trans[self.num_tags() * i + j])
    }

    /// Emission probability; words outside the vocabulary read the OOV entry.
    pub fn emit_prob(&self, tag: Tag, word: &str) -> Result<f64> {
        let i = self.tag_id(tag)?;
        Ok(self.emit[self.num_words() * i + self.vocab.lookup(word)])
    }

    #[allow(non_snake_case)]
    pub fn to_document(&self) -> ModelDocument {
        let L = self.num_tags();
        let V = self.num_words();
        let states: Vec<String> = self.tags.iter().map(String::from).collect();
        let observations: Vec<String> = self.vocab.iter().map(str::to_string).collect();

        let start_prob: BTreeMap<String, f64> = states.iter().cloned().zip(self.start.iter().copied()).collect();
        let trans_prob: BTreeMap<String, BTreeMap<String, f64>> = states
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let row: BTreeMap<String, f64> = states
                    .iter()
                    .cloned()
                    .zip(self.trans[L * i..L * (i + 1)].iter().copied())
                    .collect();
                (a.clone(), row)
            })
            .collect();
        let emit_prob: BTreeMap<String, BTreeMap<String, f64>> = states
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let row: BTreeMap<String, f64> = observations
                    .iter()
                    .cloned()
                    .zip(self.emit[V * i..V * (i + 1)].iter().copied())
                    .collect();
                (a.clone(), row)
            })
            .collect();

        ModelDocument { states, observations, start_prob, trans_prob, emit_prob }
    }

    /// Rebuilds a model from a document without touching any counts.
    pub fn from_document(doc: &ModelDocument) -> Result<Self> {
        if doc.states.is_empty() {
            return Err(Error::InvalidModel("no states".into()));
        }
        let states = doc
            .states
            .iter()
            .map(|s| s.parse::<Tag>())
            .collect::<Result<Vec<_>>>()?;
        let tags = TagSet::new(&states);
        if tags.len() != states.len() {
            return Err(Error::InvalidModel("duplicate states".into()));
        }
        // the sentinel always exists, even in foreign documents; emission keys
        // missing from `observations` still belong to the vocabulary
        let emitted = doc
            .states
            .iter()
            .filter_map(|s| doc.emit_prob.get(s))
            .flat_map(|row| row.keys())
            .map(String::as_str);
        let vocab = Vocabulary::from_words(
            std::iter::once(OOV)
                .chain(doc.observations.iter().map(String::as_str))
                .chain(emitted),
        );

        let start = doc
            .states
            .iter()
            .map(|s| {
                doc.start_prob
                    .get(s)
                    .map(|&p| floored(p))
                    .ok_or_else(|| Error::MissingParameter(format!("start_prob[{s}]")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut trans = Vec::with_capacity(tags.len() * tags.len());
        for a in &doc.states {
            let row = doc
                .trans_prob
                .get(a)
                .ok_or_else(|| Error::MissingParameter(format!("trans_prob[{a}]")))?;
            trans.extend(doc.states.iter().map(|b| row.get(b).map_or(PROB_FLOOR, |&p| floored(p))));
        }

        let mut emit = Vec::with_capacity(tags.len() * vocab.len());
        for a in &doc.states {
            let row = doc
                .emit_prob
                .get(a)
                .ok_or_else(|| Error::MissingParameter(format!("emit_prob[{a}]")))?;
            emit.extend(vocab.iter().map(|w| row.get(w).map_or(PROB_FLOOR, |&p| floored(p))));
        }

        Ok(Self::from_parts(tags, vocab, start, trans, emit))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.to_document())?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let doc: ModelDocument = serde_json::from_reader(reader)?;
        Self::from_document(&doc)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        self.to_writer(&mut w)?;
        w.flush()?;
        log::info!("model written to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model = Self::from_reader(BufReader::new(File::open(path.as_ref())?))?;
        log::info!(
            "model loaded from {} (tags: {}, words: {})",
            path.as_ref().display(),
            model.num_tags(),
            model.num_words()
        );
        Ok(model)
    }
}

#[inline]
fn floored(p: f64) -> f64 {
    if p.is_finite() && p > 0.0 {
        p
    } else {
        PROB_FLOOR
    }
}
