mod movie;
pub use movie::*;

pub mod config;
pub mod corpus;
pub mod error;
pub mod recommend;
pub mod source;
pub mod space;
pub mod tokenizer;

pub use config::EngineConfig;
pub use corpus::{prepare, Corpus};
pub use error::{ConfigurationError, Error, Result};
pub use recommend::{recommend, recommend_by_genres, GenreFilter, Recommendation, Recommender};
pub use space::{fit, VectorSpace};
