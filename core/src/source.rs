use crate::{ConfigurationError, RawMovie, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const ID_COLUMNS: &[&str] = &["external_id", "imdbId", "imdb_id"];

/// Load raw rows from a `.csv`, `.json` or `.jsonl` file, or from every such file
/// under a directory (file-name order).
pub fn load_movies<P: AsRef<Path>>(path: P) -> Result<Vec<RawMovie>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_supported(p) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut movies = Vec::new();
    for file in files {
        let before = movies.len();
        match extension(&file) {
            Some("jsonl") => movies.extend(read_jsonl(BufReader::new(File::open(&file)?))?),
            Some("json") => movies.extend(read_json(BufReader::new(File::open(&file)?))?),
            _ => movies.extend(read_csv(File::open(&file)?)?),
        }
        tracing::info!(file = %file.display(), rows = movies.len() - before, "loaded movies");
    }
    Ok(movies)
}

fn extension(p: &Path) -> Option<&str> { p.extension().and_then(|s| s.to_str()) }

fn is_supported(p: &Path) -> bool { matches!(extension(p), Some("csv" | "json" | "jsonl")) }

/// Header-driven CSV. `title` and `genres` columns are required; empty cells are missing values.
/// Rows that fail to parse are skipped with a warning.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawMovie>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);
    let title_idx = col("title").ok_or(ConfigurationError::MissingColumn("title"))?;
    let genres_idx = col("genres").ok_or(ConfigurationError::MissingColumn("genres"))?;
    let features_idx = col("combined_features");
    let id_idx = ID_COLUMNS.iter().find_map(|c| col(*c));

    let mut movies = Vec::new();
    let mut skipped = 0usize;
    for (line, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(line = line + 2, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };
        movies.push(RawMovie {
            title: cell(Some(title_idx)).unwrap_or_default(),
            genres: cell(Some(genres_idx)),
            // only a truly empty cell is missing here; blanks reach the drop rule
            combined_features: features_idx
                .and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            external_id: cell(id_idx),
        });
    }
    if skipped > 0 {
        tracing::warn!(skipped, "CSV rows skipped");
    }
    Ok(movies)
}

/// A JSON array of movies or a single movie object. Elements that are not movies are skipped.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<RawMovie>> {
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        serde_json::Value::Object(_) => vec![json],
        _ => Vec::new(),
    };
    let mut movies = Vec::with_capacity(values.len());
    for (idx, v) in values.into_iter().enumerate() {
        match serde_json::from_value(v) {
            Ok(movie) => movies.push(movie),
            Err(e) => tracing::warn!(idx, error = %e, "skipping malformed JSON movie"),
        }
    }
    Ok(movies)
}

/// One movie per non-blank line. Lines that do not decode are skipped.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<RawMovie>> {
    let mut movies = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match serde_json::from_str(&line) {
            Ok(movie) => movies.push(movie),
            Err(e) => tracing::warn!(line = idx + 1, error = %e, "skipping malformed JSONL line"),
        }
    }
    Ok(movies)
}
