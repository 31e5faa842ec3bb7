//! First-order Hidden Markov Model part-of-speech tagger.
//!
//! ```no_run
//! use postag::{Corpus, ParameterEstimator, ReaderConfig, TagSet, Tagger, TrainerConfig};
//!
//! let corpus = Corpus::from_conllu_path("en_gum-ud-train.conllu", &ReaderConfig::default()).unwrap();
//! let estimator = ParameterEstimator::fit(TagSet::upos(), &corpus.sentences, &TrainerConfig::default()).unwrap();
//! let model = estimator.derive();
//! model.save("hmm_params.json").unwrap();
//!
//! let tagger = Tagger::new(&model);
//! let tags = tagger.tag(&["the", "dog", "runs"]).unwrap();
//! println!("{:?}", tags);
//! ```

pub mod dataset;
pub mod error;
pub mod hmm;
pub mod quark;
pub mod tag;

pub use dataset::{Corpus, CorpusFormat, ReaderConfig, Sentence};
pub use error::{Error, Result};
pub use hmm::{
    counts::TrainingCounts,
    model::{ModelDocument, ProbabilityModel},
    tagger::{decode, Tagger},
    trainer::{ParameterEstimator, TrainerConfig},
    vocab::{Vocabulary, OOV},
};
pub use tag::{Tag, TagSet};
