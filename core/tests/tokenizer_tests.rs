use recommender_core::tokenizer::{is_stopword, tokenize};

#[test]
fn it_lowercases_and_splits_on_punctuation() {
    let words = tokenize("Adventure Animation|Children's Sci-Fi");
    assert_eq!(words, vec!["adventure", "animation", "children", "sci", "fi"]);
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(is_stopword("amongst"));
}

#[test]
fn it_keeps_repeats() {
    assert_eq!(tokenize("drama drama"), vec!["drama", "drama"]);
}
