use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Universal Dependencies part-of-speech categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Tag {
    pub const ALL: [Tag; 17] = [
        Tag::Adj,
        Tag::Adp,
        Tag::Adv,
        Tag::Aux,
        Tag::Cconj,
        Tag::Det,
        Tag::Intj,
        Tag::Noun,
        Tag::Num,
        Tag::Part,
        Tag::Pron,
        Tag::Propn,
        Tag::Punct,
        Tag::Sconj,
        Tag::Sym,
        Tag::Verb,
        Tag::X,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Adj => "ADJ",
            Tag::Adp => "ADP",
            Tag::Adv => "ADV",
            Tag::Aux => "AUX",
            Tag::Cconj => "CCONJ",
            Tag::Det => "DET",
            Tag::Intj => "INTJ",
            Tag::Noun => "NOUN",
            Tag::Num => "NUM",
            Tag::Part => "PART",
            Tag::Pron => "PRON",
            Tag::Propn => "PROPN",
            Tag::Punct => "PUNCT",
            Tag::Sconj => "SCONJ",
            Tag::Sym => "SYM",
            Tag::Verb => "VERB",
            Tag::X => "X",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownTag(s.to_string()))
    }
}

impl TryFrom<String> for Tag {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tag> for String {
    fn from(value: Tag) -> Self {
        value.as_str().to_string()
    }
}

/// Ordered set of tags a model is defined over.
///
/// Positions in this set are the dense tag ids used to index every
/// probability table, and iteration order is the decoder's tie-breaking order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
    ids: [Option<usize>; Tag::ALL.len()],
}

impl TagSet {
    /// Builds a tag set; repeated tags keep their first position.
    pub fn new(tags: &[Tag]) -> Self {
        let mut this = Self {
            tags: Vec::with_capacity(tags.len()),
            ids: [None; Tag::ALL.len()],
        };
        for &tag in tags {
            if this.ids[tag as usize].is_none() {
                this.ids[tag as usize] = Some(this.tags.len());
                this.tags.push(tag);
            }
        }
        this
    }

    /// The full 17-tag UPOS universe.
    pub fn upos() -> Self {
        Self::new(&Tag::ALL)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[inline]
    pub fn id(&self, tag: Tag) -> Option<usize> {
        self.ids[tag as usize]
    }

    #[inline]
    pub fn get(&self, id: usize) -> Option<Tag> {
        self.tags.get(id).copied()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.id(tag).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tags.iter().copied()
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::upos()
    }
}
