use crate::{MovieRecord, RawMovie};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref YEAR_SUFFIX: Regex = Regex::new(r"\s+\((\d{4})\)\s*$").expect("valid regex");
}

/// MovieLens placeholder "(no genres listed)", split into whitespace tokens.
const NO_GENRES_TOKENS: &[&str] = &["(no", "genres", "listed)"];

/// Prepared movies in source order. Row `i` here is row `i` of the fitted vector space.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<MovieRecord>,
}

impl Corpus {
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn get(&self, row: usize) -> Option<&MovieRecord> { self.records.get(row) }
    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> { self.records.iter() }
    pub fn records(&self) -> &[MovieRecord] { &self.records }

    /// First exact title match, else first case-insensitive substring match.
    pub fn find_title(&self, query: &str) -> Option<usize> {
        if query.trim().is_empty() {
            return None;
        }
        if let Some(row) = self.records.iter().position(|m| m.title == query) {
            return Some(row);
        }
        let needle = query.to_lowercase();
        self.records.iter().position(|m| m.title.to_lowercase().contains(&needle))
    }

    /// Sorted unique genre tokens across the corpus, without the "no genres" placeholder.
    pub fn genre_vocabulary(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .records
            .iter()
            .flat_map(|m| m.genre_tokens())
            .filter(|g| !NO_GENRES_TOKENS.contains(g))
            .collect();
        set.into_iter().map(str::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a MovieRecord;
    type IntoIter = std::slice::Iter<'a, MovieRecord>;
    fn into_iter(self) -> Self::IntoIter { self.records.iter() }
}

/// Normalize raw rows into movie records, dropping rows with no usable features.
pub fn prepare<I: IntoIterator<Item = RawMovie>>(raw: I) -> Corpus {
    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in raw {
        let record = prepare_row(row);
        if record.features.trim().is_empty() {
            dropped += 1;
            continue;
        }
        records.push(record);
    }
    tracing::info!(kept = records.len(), dropped, "prepared corpus");
    Corpus { records }
}

fn prepare_row(raw: RawMovie) -> MovieRecord {
    let (title_clean, year) = match YEAR_SUFFIX.captures(&raw.title) {
        Some(caps) => {
            let whole = caps.get(0).map_or(raw.title.len(), |m| m.start());
            (raw.title[..whole].to_string(), caps.get(1).map(|m| m.as_str().to_string()))
        }
        None => (raw.title.clone(), None),
    };
    let genres = raw.genres.unwrap_or_default().replace('|', " ");
    // a present but blank value is kept and falls to the drop rule
    let features = match raw.combined_features {
        Some(cf) => cf,
        None => genres.clone(),
    };
    MovieRecord { title: raw.title, title_clean, year, genres, features, external_id: raw.external_id }
}
