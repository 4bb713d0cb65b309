use crate::recommend::GenreFilter;
use serde::{Deserialize, Deserializer, Serialize};

/// One row as delivered by a data source, before preparation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMovie {
    pub title: String,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub combined_features: Option<String>,
    #[serde(default, alias = "imdbId", alias = "imdb_id", deserialize_with = "opaque_id")]
    pub external_id: Option<String>,
}

impl RawMovie {
    pub fn new(title: impl Into<String>, genres: impl Into<String>) -> Self {
        Self { title: title.into(), genres: Some(genres.into()), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    pub title: String,
    pub title_clean: String,
    pub year: Option<String>,
    /// Genre tokens joined by single spaces, e.g. "Animation Comedy".
    pub genres: String,
    /// Text fed to the vectorizer.
    pub features: String,
    pub external_id: Option<String>,
}

impl MovieRecord {
    pub fn genre_tokens(&self) -> impl Iterator<Item = &str> {
        self.genres.split_whitespace()
    }

    pub fn has_any_genre(&self, filter: &GenreFilter) -> bool {
        self.genre_tokens().any(|g| filter.contains(g))
    }
}

/// Ids arrive as strings or numbers depending on the source.
fn opaque_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let v: Option<serde_json::Value> = Option::deserialize(de)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
