use crate::tokenizer::tokenize;
use crate::{ConfigurationError, Corpus, EngineConfig, Result};
use std::collections::{HashMap, HashSet};

pub type TermId = u32;

/// Sparse row: (term id, weight) pairs sorted by term id.
pub type SparseRow = Vec<(TermId, f32)>;

/// TF-IDF rows aligned with the corpus it was fitted on. Immutable once built.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    dictionary: HashMap<String, TermId>,
    idf: Vec<f32>,
    rows: Vec<SparseRow>,
}

pub fn fit(corpus: &Corpus, config: &EngineConfig) -> Result<VectorSpace> {
    VectorSpace::fit(corpus, config)
}

impl VectorSpace {
    pub fn fit(corpus: &Corpus, config: &EngineConfig) -> Result<Self> {
        if config.max_features == 0 {
            return Err(ConfigurationError::ZeroMaxFeatures.into());
        }
        let n = corpus.len();
        if n < 2 {
            return Err(ConfigurationError::TooFewDocuments { found: n }.into());
        }

        let docs: Vec<Vec<String>> = corpus.iter().map(|m| tokenize(&m.features)).collect();
        let mut totals: HashMap<&str, u64> = HashMap::new();
        let mut df: HashMap<&str, u32> = HashMap::new();
        for tokens in &docs {
            let mut seen: HashSet<&str> = HashSet::with_capacity(tokens.len());
            for t in tokens {
                *totals.entry(t.as_str()).or_insert(0) += 1;
                if seen.insert(t.as_str()) {
                    *df.entry(t.as_str()).or_insert(0) += 1;
                }
            }
        }
        if totals.is_empty() {
            return Err(ConfigurationError::EmptyVocabulary.into());
        }

        let mut terms: Vec<(&str, u64)> = totals.into_iter().collect();
        if terms.len() > config.max_features {
            terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            terms.truncate(config.max_features);
        }
        let mut terms: Vec<&str> = terms.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();

        let n_f = n as f32;
        let mut dictionary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (id, term) in terms.iter().enumerate() {
            let df_t = df.get(term).copied().unwrap_or(0) as f32;
            idf.push(((1.0 + n_f) / (1.0 + df_t)).ln() + 1.0);
            dictionary.insert(term.to_string(), id as TermId);
        }

        let mut empty_rows = 0usize;
        let rows: Vec<SparseRow> = docs
            .iter()
            .map(|tokens| {
                let mut tf: HashMap<TermId, u32> = HashMap::new();
                for t in tokens {
                    if let Some(&tid) = dictionary.get(t.as_str()) {
                        *tf.entry(tid).or_insert(0) += 1;
                    }
                }
                let mut row: SparseRow = tf
                    .into_iter()
                    .map(|(tid, count)| (tid, count as f32 * idf[tid as usize]))
                    .collect();
                row.sort_by_key(|(tid, _)| *tid);
                let norm = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() { *w /= norm; }
                } else {
                    empty_rows += 1;
                }
                row
            })
            .collect();

        tracing::info!(num_docs = n, num_terms = dictionary.len(), empty_rows, "fitted vector space");
        Ok(Self { dictionary, idf, rows })
    }

    pub fn num_docs(&self) -> usize { self.rows.len() }
    pub fn num_terms(&self) -> usize { self.dictionary.len() }
    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }
    pub fn idf(&self, term: &str) -> Option<f32> { self.term_id(term).map(|t| self.idf[t as usize]) }
    pub fn row(&self, i: usize) -> Option<&SparseRow> { self.rows.get(i) }

    /// Cosine similarity between two rows; 0.0 if either is out of range or all-zero.
    pub fn similarity(&self, i: usize, j: usize) -> f32 {
        match (self.rows.get(i), self.rows.get(j)) {
            (Some(a), Some(b)) => dot(a, b),
            _ => 0.0,
        }
    }

    /// Similarity of row `i` to every row, self included.
    pub fn similarities_to(&self, i: usize) -> Vec<f32> {
        match self.rows.get(i) {
            Some(q) => self.rows.iter().map(|r| dot(q, r)).collect(),
            None => vec![0.0; self.rows.len()],
        }
    }
}

// rows are unit length (or empty), so the dot product is the cosine
fn dot(a: &SparseRow, b: &SparseRow) -> f32 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0f32);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
