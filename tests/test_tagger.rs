extern crate postag;

use std::io::Write;

use postag::{decode, Error, ParameterEstimator, ProbabilityModel, Tag, TagSet, Tagger, TrainerConfig, OOV};

fn sent(words: &[(&str, Tag)]) -> Vec<(String, Tag)> {
    words.iter().map(|(w, t)| (w.to_string(), *t)).collect()
}

fn two_tag_model() -> ProbabilityModel {
    let corpus = vec![
        sent(&[("a", Tag::Noun), ("b", Tag::Verb)]),
        sent(&[("a", Tag::Noun), ("b", Tag::Verb)]),
    ];
    ParameterEstimator::fit(TagSet::new(&[Tag::Noun, Tag::Verb]), &corpus, &TrainerConfig::default())
        .unwrap()
        .derive()
}

fn upos_model() -> ProbabilityModel {
    let corpus = vec![
        sent(&[("the", Tag::Det), ("dog", Tag::Noun), ("runs", Tag::Verb), (".", Tag::Punct)]),
        sent(&[("a", Tag::Det), ("big", Tag::Adj), ("cat", Tag::Noun), ("sleeps", Tag::Verb), (".", Tag::Punct)]),
        sent(&[("she", Tag::Pron), ("runs", Tag::Verb), ("quickly", Tag::Adv), (".", Tag::Punct)]),
        sent(&[("the", Tag::Det), ("cat", Tag::Noun), ("and", Tag::Cconj), ("the", Tag::Det), ("dog", Tag::Noun), ("run", Tag::Verb)]),
    ];
    ParameterEstimator::fit(TagSet::upos(), &corpus, &TrainerConfig::default())
        .unwrap()
        .derive()
}

#[test]
fn test_two_tag_universe() {
    let model = two_tag_model();
    assert_eq!(decode(&["a", "b"], &model).unwrap(), vec![Tag::Noun, Tag::Verb]);
}

#[test]
fn test_unknown_word_falls_back_to_oov() {
    let model = upos_model();
    assert!(!model.vocabulary().contains("zebra"));
    for tag in TagSet::upos().iter() {
        assert_eq!(model.emit_prob(tag, "zebra").unwrap(), model.emit_prob(tag, OOV).unwrap());
    }
    let tags = decode(&["the", "zebra", "runs", "."], &model).unwrap();
    assert_eq!(tags, vec![Tag::Det, Tag::Noun, Tag::Verb, Tag::Punct]);
}

#[test]
fn test_empty_input_is_rejected() {
    let model = upos_model();
    let empty: Vec<String> = Vec::new();
    assert!(matches!(decode(&empty, &model), Err(Error::InvalidInput(_))));
    assert!(matches!(Tagger::new(&model).tag(&empty), Err(Error::InvalidInput(_))));
}

#[test]
fn test_length_and_determinism() {
    let model = upos_model();
    let tagger = Tagger::new(&model);
    let inputs: Vec<Vec<&str>> = vec![
        vec!["the"],
        vec!["the", "dog", "runs", "."],
        vec!["unknown", "words", "only"],
        vec!["the"; 200],
    ];
    for tokens in &inputs {
        let first = tagger.tag(tokens).unwrap();
        assert_eq!(first.len(), tokens.len());
        for _ in 0..3 {
            assert_eq!(tagger.tag(tokens).unwrap(), first);
        }
        assert_eq!(decode(tokens, &model).unwrap(), first);
    }
}

#[test]
fn test_long_sentence_does_not_underflow() {
    let model = upos_model();
    let tokens: Vec<&str> = ["the", "dog", "runs", "."].iter().copied().cycle().take(4000).collect();
    let (tags, score) = Tagger::new(&model).tag_with_score(&tokens).unwrap();
    assert_eq!(tags.len(), tokens.len());
    assert!(score.is_finite());
    assert!(score < 0.0);
    assert_eq!(&tags[..4], &[Tag::Det, Tag::Noun, Tag::Verb, Tag::Punct]);
}

#[test]
fn test_saved_model_decodes_the_same() {
    let model = upos_model();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    model.to_writer(&mut file).unwrap();
    file.flush().unwrap();

    let loaded = ProbabilityModel::load(file.path()).unwrap();
    assert_eq!(loaded.tags(), model.tags());
    assert_eq!(loaded.vocabulary(), model.vocabulary());
    assert_eq!(loaded, model);

    let tokens = ["she", "runs", "and", "the", "cat", "sleeps", "."];
    assert_eq!(decode(&tokens, &loaded).unwrap(), decode(&tokens, &model).unwrap());
}

#[test]
fn test_model_with_other_tag_set() {
    let model = two_tag_model();
    assert!(matches!(model.start_prob(Tag::Det), Err(Error::MissingParameter(_))));
    assert!(matches!(model.emit_prob(Tag::Adj, "a"), Err(Error::MissingParameter(_))));
}

#[test]
fn test_load_missing_file() {
    let ret = ProbabilityModel::load("tests/does-not-exist.json");
    assert!(matches!(ret, Err(Error::Io(_))));
}

#[test]
fn test_load_foreign_document() {
    let json = r#"{
        "states": ["NOUN", "VERB"],
        "observations": ["fish", "swim"],
        "start_prob": {"NOUN": 0.9, "VERB": 0.1},
        "trans_prob": {"NOUN": {"VERB": 1.0}, "VERB": {"NOUN": 0.5, "VERB": 0.5}},
        "emit_prob": {"NOUN": {"fish": 0.9}, "VERB": {"swim": 0.9, "fish": 0.1}}
    }"#;
    let model = ProbabilityModel::from_reader(json.as_bytes()).unwrap();
    assert_eq!(model.num_words(), 3);
    let tags = decode(&["fish", "swim"], &model).unwrap();
    assert_eq!(tags, vec![Tag::Noun, Tag::Verb]);
    // unseen word, missing cells: still decodes
    assert_eq!(decode(&["ocean"], &model).unwrap().len(), 1);

    let missing_row = r#"{
        "states": ["NOUN", "VERB"],
        "observations": [],
        "start_prob": {"NOUN": 0.9, "VERB": 0.1},
        "trans_prob": {"NOUN": {}},
        "emit_prob": {"NOUN": {}, "VERB": {}}
    }"#;
    assert!(matches!(
        ProbabilityModel::from_reader(missing_row.as_bytes()),
        Err(Error::MissingParameter(_))
    ));
}

#[test]
fn test_emissions_outside_observations_are_kept() {
    let json = r#"{
        "states": ["NOUN", "VERB"],
        "observations": [],
        "start_prob": {"NOUN": 0.6, "VERB": 0.4},
        "trans_prob": {"NOUN": {"NOUN": 0.3, "VERB": 0.7}, "VERB": {"NOUN": 0.6, "VERB": 0.4}},
        "emit_prob": {"NOUN": {"swim": 0.9}, "VERB": {"fish": 0.9, "swim": 0.1}}
    }"#;
    let model = ProbabilityModel::from_reader(json.as_bytes()).unwrap();
    assert_eq!(model.num_words(), 3);
    assert!(model.vocabulary().contains("swim"));
    assert_eq!(model.emit_prob(Tag::Noun, "swim").unwrap(), 0.9);
    assert_eq!(model.emit_prob(Tag::Verb, "swim").unwrap(), 0.1);
    // with the emissions dropped every cell would be floored and NOUN would lead
    assert_eq!(decode(&["fish", "swim"], &model).unwrap(), vec![Tag::Verb, Tag::Noun]);
}
