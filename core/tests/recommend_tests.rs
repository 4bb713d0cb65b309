use recommender_core::{prepare, recommend, recommend_by_genres, ConfigurationError, EngineConfig, Error, GenreFilter, RawMovie, Recommender};

fn toy_corpus() -> Vec<RawMovie> {
    vec![
        RawMovie::new("Toy Story (1995)", "Animation|Comedy"),
        RawMovie::new("Jumanji (1995)", "Adventure|Fantasy"),
        RawMovie::new("Heat (1995)", "Action|Crime"),
    ]
}

fn larger_corpus() -> Vec<RawMovie> {
    vec![
        RawMovie::new("Toy Story (1995)", "Adventure|Animation|Children|Comedy|Fantasy"),
        RawMovie::new("Jumanji (1995)", "Adventure|Children|Fantasy"),
        RawMovie::new("Grumpier Old Men (1995)", "Comedy|Romance"),
        RawMovie::new("Heat (1995)", "Action|Crime|Thriller"),
        RawMovie::new("Sabrina (1995)", "Comedy|Romance"),
        RawMovie::new("Tom and Huck (1995)", "Adventure|Children"),
        RawMovie::new("Sudden Death (1995)", "Action"),
        RawMovie::new("GoldenEye (1995)", "Action|Adventure|Thriller"),
        RawMovie::new("Balto (1995)", "Action-Adventure|Animation|Children"),
        RawMovie::new("Cutthroat Island (1995)", "Action|Adventure|Romance"),
    ]
}

#[test]
fn end_to_end_toy_example() {
    let engine = Recommender::build(toy_corpus(), EngineConfig::default()).unwrap();
    let toy = engine.corpus().get(0).unwrap();
    assert_eq!(toy.title_clean, "Toy Story");
    assert_eq!(toy.year.as_deref(), Some("1995"));
    assert_eq!(toy.genre_tokens().collect::<Vec<_>>(), vec!["Animation", "Comedy"]);

    let recs = engine.similar_to("Toy Story", 2, None);
    let titles: Vec<&str> = recs.iter().map(|r| r.movie.title.as_str()).collect();
    assert_eq!(titles, vec!["Jumanji (1995)", "Heat (1995)"]);
    assert!(recs.iter().all(|r| r.score.abs() < 1e-6));
}

#[test]
fn unknown_title_is_empty_not_error() {
    let engine = Recommender::build(toy_corpus(), EngineConfig::default()).unwrap();
    assert!(engine.similar_to("Nonexistent Movie XYZ", 5, None).is_empty());
}

#[test]
fn query_never_recommends_itself() {
    let engine = Recommender::build(larger_corpus(), EngineConfig::default()).unwrap();
    for movie in engine.corpus() {
        let recs = engine.similar_to(&movie.title, 20, None);
        assert_eq!(recs.len(), engine.corpus().len() - 1);
        let own_row = engine.corpus().find_title(&movie.title).unwrap();
        assert!(recs.iter().all(|r| r.row != own_row));
    }
}

#[test]
fn scores_are_non_increasing_and_deterministic() {
    let engine = Recommender::build(larger_corpus(), EngineConfig::default()).unwrap();
    let first = engine.similar_to("Heat (1995)", 9, None);
    for pair in first.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for _ in 0..5 {
        assert_eq!(engine.similar_to("Heat (1995)", 9, None), first);
    }
    assert_eq!(first[0].movie.title, "GoldenEye (1995)");
}

#[test]
fn equal_scores_keep_corpus_order() {
    let engine = Recommender::build(larger_corpus(), EngineConfig::default()).unwrap();
    let recs = engine.similar_to("Grumpier Old Men", 1, None);
    // Sabrina has the identical genre set and scores 1.0
    assert_eq!(recs[0].movie.title, "Sabrina (1995)");
    assert!((recs[0].score - 1.0).abs() < 1e-5);
}

#[test]
fn genre_filter_matches_whole_tokens() {
    let engine = Recommender::build(larger_corpus(), EngineConfig::default()).unwrap();
    let filter = GenreFilter::new(["Action"]);
    let recs = engine.similar_to("Toy Story", 20, Some(&filter));
    assert!(!recs.is_empty());
    assert!(recs.iter().all(|r| r.movie.genre_tokens().any(|g| g == "Action")));
    assert!(recs.iter().all(|r| r.movie.title != "Balto (1995)"));
}

#[test]
fn filtering_preserves_ranked_order() {
    let engine = Recommender::build(larger_corpus(), EngineConfig::default()).unwrap();
    let filter = GenreFilter::new(["Romance"]);
    let unfiltered: Vec<usize> = engine.similar_to("Toy Story", 20, None).iter().map(|r| r.row).collect();
    let filtered: Vec<usize> = engine.similar_to("Toy Story", 20, Some(&filter)).iter().map(|r| r.row).collect();
    let expected: Vec<usize> = unfiltered
        .into_iter()
        .filter(|row| engine.corpus().get(*row).unwrap().genre_tokens().any(|g| g == "Romance"))
        .collect();
    assert_eq!(filtered, expected);
}

#[test]
fn restrictive_filter_gives_short_list() {
    let engine = Recommender::build(larger_corpus(), EngineConfig::default()).unwrap();
    let filter = GenreFilter::new(["Thriller"]);
    let recs = engine.similar_to("Toy Story", 5, Some(&filter));
    assert_eq!(recs.len(), 2);
}

#[test]
fn overfetch_margin_bounds_the_filtered_pool() {
    let config = EngineConfig { overfetch_margin: 0, ..Default::default() };
    let corpus = prepare(larger_corpus());
    let space = recommender_core::fit(&corpus, &config).unwrap();
    let filter = GenreFilter::new(["Romance"]);
    let ranked = recommend(&space, &corpus, "Heat (1995)", 1, None, &config);
    let filtered = recommend(&space, &corpus, "Heat (1995)", 1, Some(&filter), &config);
    // only the single best candidate is considered before filtering
    let best_is_romance = ranked[0].movie.genre_tokens().any(|g| g == "Romance");
    assert_eq!(filtered.len(), usize::from(best_is_romance));
}

#[test]
fn empty_filter_means_no_filter() {
    let engine = Recommender::build(larger_corpus(), EngineConfig::default()).unwrap();
    let empty = GenreFilter::default();
    assert_eq!(engine.similar_to("Heat", 4, Some(&empty)), engine.similar_to("Heat", 4, None));
}

#[test]
fn feature_fallback_and_drop() {
    let raw = vec![
        RawMovie::new("Kept (2001)", "Drama|War"),
        RawMovie { title: "Dropped (2002)".into(), ..Default::default() },
    ];
    let corpus = prepare(raw);
    assert_eq!(corpus.len(), 1);
    let kept = corpus.get(0).unwrap();
    assert_eq!(kept.features, kept.genres);
}

#[test]
fn degenerate_fits_fail() {
    let one = Recommender::build(vec![RawMovie::new("Solo (2018)", "Sci-Fi")], EngineConfig::default());
    assert!(matches!(one, Err(Error::Configuration(ConfigurationError::TooFewDocuments { .. }))));

    let stop = vec![RawMovie::new("A", "the of"), RawMovie::new("B", "and or")];
    let stop = Recommender::build(stop, EngineConfig::default());
    assert!(matches!(stop, Err(Error::Configuration(ConfigurationError::EmptyVocabulary))));
}

#[test]
fn by_genres_keeps_corpus_order() {
    let corpus = prepare(larger_corpus());
    let popular = recommend_by_genres(&corpus, &GenreFilter::default(), 3);
    assert_eq!(popular.iter().map(|(_, m)| m.title.as_str()).collect::<Vec<_>>(), vec!["Toy Story (1995)", "Jumanji (1995)", "Grumpier Old Men (1995)"]);

    let romance = recommend_by_genres(&corpus, &GenreFilter::new(["romance"]), 10);
    assert_eq!(romance.iter().map(|(_, m)| m.title.as_str()).collect::<Vec<_>>(), vec!["Grumpier Old Men (1995)", "Sabrina (1995)", "Cutthroat Island (1995)"]);
    assert_eq!(romance.iter().map(|(row, _)| *row).collect::<Vec<_>>(), vec![2, 4, 9]);
    for (row, movie) in &romance {
        assert!(std::ptr::eq(corpus.get(*row).unwrap(), *movie));
    }

    assert!(recommend_by_genres(&corpus, &GenreFilter::new(["Western"]), 10).is_empty());
}

#[test]
fn duplicate_titles_are_independent_rows() {
    let mut raw = toy_corpus();
    raw.push(RawMovie::new("Heat (1995)", "Action|Crime"));
    let engine = Recommender::build(raw, EngineConfig::default()).unwrap();
    assert_eq!(engine.corpus().len(), 4);

    // the first "Heat (1995)" is the query; its twin is a separate row
    let recs = engine.similar_to("Heat (1995)", 3, None);
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].row, 3);
    assert_eq!(recs[0].movie.title, "Heat (1995)");
    assert!((recs[0].score - 1.0).abs() < 1e-5);
    assert!(recs.iter().all(|r| r.row != 2));
}
