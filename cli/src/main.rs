use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use recommender_core::source::load_movies;
use recommender_core::{EngineConfig, GenreFilter, MovieRecord, Recommender};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recommend")]
#[command(about = "Content-based movie recommendations from a local corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Movie data: a .csv/.json/.jsonl file or a directory of them
    #[arg(long)]
    data: String,
    /// Optional JSON engine config; flags below override it
    #[arg(long)]
    config: Option<String>,
    /// Vocabulary size cap
    #[arg(long)]
    max_features: Option<usize>,
    /// Ranked candidates kept beyond --top-n before genre filtering
    #[arg(long)]
    overfetch_margin: Option<usize>,
    /// Print JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Movies most similar to a title
    Similar {
        #[command(flatten)]
        source: Source,
        /// Title to match (exact, then case-insensitive substring)
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = 5)]
        top_n: usize,
        /// Keep only results with this genre (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
    },
    /// Movies matching any of the given genres, in corpus order
    ByGenres {
        #[command(flatten)]
        source: Source,
        #[arg(long = "genre")]
        genres: Vec<String>,
        #[arg(long, default_value_t = 5)]
        top_n: usize,
    },
    /// List the genres present in the corpus
    Genres {
        #[command(flatten)]
        source: Source,
    },
    /// Corpus and vocabulary sizes
    Stats {
        #[command(flatten)]
        source: Source,
    },
}

#[derive(Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    movie: &'a MovieRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f32>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Similar { source, title, top_n, genres } => {
            let engine = build_engine(&source)?;
            let filter = GenreFilter::new(&genres);
            let recs = engine.similar_to(&title, top_n, Some(&filter));
            if recs.is_empty() && engine.corpus().find_title(&title).is_none() {
                tracing::warn!(title = %title, "no movie matches this title");
            }
            let rows: Vec<Row> = recs.iter().map(|r| Row { movie: r.movie, score: Some(r.score) }).collect();
            print_rows(&rows, source.json)
        }
        Commands::ByGenres { source, genres, top_n } => {
            let engine = build_engine(&source)?;
            let rows: Vec<Row> = engine
                .by_genres(&GenreFilter::new(&genres), top_n)
                .into_iter()
                .map(|(_, movie)| Row { movie, score: None })
                .collect();
            print_rows(&rows, source.json)
        }
        Commands::Genres { source } => {
            let engine = build_engine(&source)?;
            let genres = engine.corpus().genre_vocabulary();
            if source.json {
                println!("{}", serde_json::to_string_pretty(&genres)?);
            } else {
                for g in genres { println!("{g}"); }
            }
            Ok(())
        }
        Commands::Stats { source } => {
            let engine = build_engine(&source)?;
            let stats = serde_json::json!({
                "movies": engine.corpus().len(),
                "terms": engine.space().num_terms(),
                "genres": engine.corpus().genre_vocabulary().len(),
                "max_features": engine.config().max_features,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

fn build_engine(source: &Source) -> Result<Recommender> {
    let mut config = match &source.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(m) = source.max_features { config.max_features = m; }
    if let Some(m) = source.overfetch_margin { config.overfetch_margin = m; }

    let raw = load_movies(&source.data)?;
    let engine = Recommender::build(raw, config)?;
    tracing::info!(data = %source.data, movies = engine.corpus().len(), terms = engine.space().num_terms(), "engine ready");
    Ok(engine)
}

fn print_rows(rows: &[Row], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    for (rank, row) in rows.iter().enumerate() {
        let year = row.movie.year.as_deref().unwrap_or("----");
        match row.score {
            Some(score) => println!("{:>3}. {:.4}  {} ({})  [{}]", rank + 1, score, row.movie.title_clean, year, row.movie.genres),
            None => println!("{:>3}. {} ({})  [{}]", rank + 1, row.movie.title_clean, year, row.movie.genres),
        }
    }
    Ok(())
}
