use crate::{prepare, Corpus, EngineConfig, MovieRecord, RawMovie, Result, VectorSpace};
use serde::Serialize;
use std::collections::HashSet;

/// Whole-token, case-insensitive genre set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreFilter {
    tokens: HashSet<String>,
}

impl GenreFilter {
    /// Each input may itself hold several genres separated by pipes or whitespace.
    pub fn new<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = genres
            .into_iter()
            .flat_map(|g| {
                g.as_ref()
                    .split(|c: char| c == '|' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

    pub fn contains(&self, genre: &str) -> bool {
        self.tokens.contains(&genre.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    pub row: usize,
    pub movie: &'a MovieRecord,
    pub score: f32,
}

/// Rank every other movie by similarity to `query_title`, then filter by genre and truncate.
///
/// An unknown title yields an empty list, and a list shorter than `top_n` is a
/// normal outcome when the filter is restrictive.
pub fn recommend<'a>(
    space: &VectorSpace,
    corpus: &'a Corpus,
    query_title: &str,
    top_n: usize,
    genre_filter: Option<&GenreFilter>,
    config: &EngineConfig,
) -> Vec<Recommendation<'a>> {
    let Some(query_row) = corpus.find_title(query_title) else {
        tracing::debug!(query_title, "no matching title");
        return Vec::new();
    };
    if top_n == 0 {
        return Vec::new();
    }

    let scores = space.similarities_to(query_row);
    let mut ranked: Vec<(usize, f32)> = scores
        .into_iter()
        .enumerate()
        .filter(|(row, _)| *row != query_row)
        .collect();
    // stable: equal scores keep corpus order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let filter = genre_filter.filter(|f| !f.is_empty());
    let candidates = match filter {
        Some(_) => top_n.saturating_add(config.overfetch_margin),
        None => top_n,
    };

    let results: Vec<Recommendation<'a>> = ranked
        .into_iter()
        .take(candidates)
        .filter_map(|(row, score)| corpus.get(row).map(|movie| Recommendation { row, movie, score }))
        .filter(|r| filter.map_or(true, |f| r.movie.has_any_genre(f)))
        .take(top_n)
        .collect();

    tracing::debug!(query_title, query_row, candidates, returned = results.len(), "ranked recommendations");
    results
}

/// `(row, movie)` pairs matching any preferred genre, in corpus order. No similarity scoring.
pub fn recommend_by_genres<'a>(corpus: &'a Corpus, preferred: &GenreFilter, top_n: usize) -> Vec<(usize, &'a MovieRecord)> {
    corpus
        .iter()
        .enumerate()
        .filter(|(_, m)| preferred.is_empty() || m.has_any_genre(preferred))
        .take(top_n)
        .collect()
}

/// Prepared corpus and its fitted space, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Recommender {
    corpus: Corpus,
    space: VectorSpace,
    config: EngineConfig,
}

impl Recommender {
    pub fn build<I: IntoIterator<Item = RawMovie>>(raw: I, config: EngineConfig) -> Result<Self> {
        let corpus = prepare(raw);
        let space = VectorSpace::fit(&corpus, &config)?;
        Ok(Self { corpus, space, config })
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }
    pub fn space(&self) -> &VectorSpace { &self.space }
    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn similar_to(&self, title: &str, top_n: usize, genre_filter: Option<&GenreFilter>) -> Vec<Recommendation<'_>> {
        recommend(&self.space, &self.corpus, title, top_n, genre_filter, &self.config)
    }

    pub fn by_genres(&self, preferred: &GenreFilter, top_n: usize) -> Vec<(usize, &MovieRecord)> {
        recommend_by_genres(&self.corpus, preferred, top_n)
    }
}
