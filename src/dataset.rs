use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{error::Result, tag::Tag};

/// One tagged sentence.
pub type Sentence = Vec<(String, Tag)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CorpusFormat {
    /// CoNLL-U: FORM in column 2, UPOS in column 4.
    Conllu,
    /// `word<TAB>TAG` per line.
    Tsv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Lower-case every word form.
    pub lowercase: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { lowercase: true }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Corpus {
    pub sentences: Vec<Sentence>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).sum()
    }

    pub fn max_length(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn read<R: BufRead>(&mut self, reader: R, format: CorpusFormat, config: &ReaderConfig) -> Result<()> {
        match format {
            CorpusFormat::Conllu => self.read_conllu(reader, config),
            CorpusFormat::Tsv => self.read_tsv(reader, config),
        }
    }

    pub fn read_path<P: AsRef<Path>>(&mut self, path: P, format: CorpusFormat, config: &ReaderConfig) -> Result<()> {
        let before = self.len();
        self.read(BufReader::new(File::open(path.as_ref())?), format, config)?;
        log::info!("read {} sentences from {}", self.len() - before, path.as_ref().display());
        Ok(())
    }

    pub fn from_conllu_path<P: AsRef<Path>>(path: P, config: &ReaderConfig) -> Result<Self> {
        let mut this = Self::default();
        this.read_path(path, CorpusFormat::Conllu, config)?;
        Ok(this)
    }

    fn push(&mut self, sent: &mut Sentence) {
        if !sent.is_empty() {
            self.sentences.push(std::mem::take(sent));
        }
    }

    /// Reads CoNLL-U. Multi-word tokens (`1-2`) and empty nodes (`1.1`) are
    /// skipped, so are malformed records.
    pub fn read_conllu<R: BufRead>(&mut self, reader: R, config: &ReaderConfig) -> Result<()> {
        let mut sent = Sentence::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                self.push(&mut sent);
                continue;
            }
            if line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 4 {
                log::warn!("line {}: expected 10 columns, got {}", n + 1, fields.len());
                continue;
            }
            if fields[0].parse::<usize>().is_err() {
                continue;
            }
            if let Some(token) = token(fields[1], fields[3], config) {
                sent.push(token);
            } else {
                log::warn!("line {}: invalid record: {line}", n + 1);
            }
        }
        self.push(&mut sent);
        Ok(())
    }

    /// Reads `word<TAB>TAG` lines, sentences separated by blank lines.
    pub fn read_tsv<R: BufRead>(&mut self, reader: R, config: &ReaderConfig) -> Result<()> {
        let mut sent = Sentence::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                self.push(&mut sent);
                continue;
            }
            match line.split_once('\t').and_then(|(w, t)| token(w, t, config)) {
                Some(token) => sent.push(token),
                None => log::warn!("line {}: invalid line: {line}", n + 1),
            }
        }
        self.push(&mut sent);
        Ok(())
    }
}

fn token(form: &str, upos: &str, config: &ReaderConfig) -> Option<(String, Tag)> {
    let form = form.trim();
    if form.is_empty() || form == "_" {
        return None;
    }
    let tag = upos.trim().parse::<Tag>().ok()?;
    let word = if config.lowercase { form.to_lowercase() } else { form.to_string() };
    Some((word, tag))
}
