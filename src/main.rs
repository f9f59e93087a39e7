use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vinylx_core::{Album, AlbumProvider, AlbumQuery, DiscogsExportProvider, JsonFileProvider};
use vinylx_features::{
    feature_importance, AlbumComparison, FeatureAnalysis, FeatureConfig, FeatureExtractor,
    FittedPipeline,
};
use vinylx_storage::{CachedProvider, CollectionCache, CollectionSummary, LoadOrigin};

/// Feature vectors for a personal record collection
#[derive(Parser, Debug)]
#[command(name = "vinylx")]
#[command(about = "Turn a record collection into feature vectors", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, env = "VINYLX_LOG", default_value = "info", global = true)]
    log_level: String,

    /// Feature configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the pipeline and report the feature space
    Fit {
        #[command(flatten)]
        input: InputArgs,

        /// Write the feature matrix as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the non-zero features of one album
    Explain {
        #[command(flatten)]
        input: InputArgs,

        /// Album id, "Artist - Title" or a title (case-insensitive substrings)
        album: AlbumQuery,

        /// Number of features to show
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Cosine similarity and shared features of two albums
    Compare {
        #[command(flatten)]
        input: InputArgs,

        /// Album id, "Artist - Title" or a title
        first: AlbumQuery,
        /// Album id, "Artist - Title" or a title
        second: AlbumQuery,
    },
    /// Inspect or maintain the cache
    Cache {
        /// Cache directory
        #[arg(long, default_value = "./cache")]
        cache_dir: PathBuf,

        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum CacheAction {
    /// Entry counts, sizes and hit counts
    Stats,
    /// Remove expired entries
    Cleanup,
    /// Remove every entry
    Clear,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Collection file
    #[arg(short, long)]
    input: PathBuf,

    /// Layout of the collection file
    #[arg(long, value_enum, default_value_t = InputFormat::Discogs)]
    format: InputFormat,

    /// Discogs username, used to name the cached collection
    #[arg(long)]
    username: Option<String>,

    /// Read through a cache in this directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Ignore cached data and reload the file
    #[arg(long)]
    refresh: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    /// Discogs collection export (pages with a `releases` array)
    Discogs,
    /// JSON array of normalized albums
    Albums,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting vinylx v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Fit {
            input,
            output,
            json,
        } => {
            let (albums, summary) = load_albums(&input)?;
            let mut extractor = FeatureExtractor::new(config);
            let matrix = extractor.fit_transform(&albums)?;
            let pipeline = extractor.pipeline()?;

            if let Some(path) = output {
                let document = serde_json::json!({
                    "feature_names": pipeline.feature_names(),
                    "album_ids": albums.iter().map(|a| a.id).collect::<Vec<_>>(),
                    "rows": matrix.rows().collect::<Vec<_>>(),
                });
                std::fs::write(&path, serde_json::to_vec_pretty(&document)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!("Feature matrix written to {:?}", path);
            }

            let analysis = FeatureAnalysis::from_matrix(pipeline, &matrix);
            if json {
                let report = serde_json::json!({
                    "collection": summary,
                    "n_features": pipeline.n_features(),
                    "profile": pipeline.profile(),
                    "analysis": analysis,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_fit_report(&summary, pipeline, &analysis);
            }
        }
        Command::Explain { input, album, top } => {
            let (albums, _) = load_albums(&input)?;
            let pipeline = FittedPipeline::fit(&config, &albums)?;
            let target = find_album(&albums, &album)?;

            println!("{}", target.display_name());
            for (name, value) in feature_importance(&pipeline, target).into_iter().take(top) {
                println!("  {:<40} {:.4}", name, value);
            }
        }
        Command::Compare {
            input,
            first,
            second,
        } => {
            let (albums, _) = load_albums(&input)?;
            let pipeline = FittedPipeline::fit(&config, &albums)?;
            let a = find_album(&albums, &first)?;
            let b = find_album(&albums, &second)?;
            let comparison = AlbumComparison::compute(&pipeline, a, b);

            println!("{}", a.display_name());
            println!("{}", b.display_name());
            println!("Cosine similarity: {:.4}", comparison.similarity);
            println!("Shared features ({}):", comparison.shared_features.len());
            for name in &comparison.shared_features {
                println!("  {}", name);
            }
        }
        Command::Cache { cache_dir, action } => {
            let cache = CollectionCache::open(&cache_dir)?;
            match action {
                CacheAction::Stats => {
                    println!("{}", serde_json::to_string_pretty(&cache.stats()?)?);
                }
                CacheAction::Cleanup => {
                    println!("Removed {} expired entries", cache.cleanup()?);
                }
                CacheAction::Clear => {
                    println!("Removed {} entries", cache.clear()?);
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FeatureConfig> {
    match path {
        Some(path) => {
            info!("Loading feature configuration from {:?}", path);
            Ok(FeatureConfig::from_toml_file(path)?)
        }
        None => Ok(FeatureConfig::default()),
    }
}

fn load_albums(input: &InputArgs) -> anyhow::Result<(Vec<Album>, CollectionSummary)> {
    let provider: Box<dyn AlbumProvider> = match input.format {
        InputFormat::Discogs => {
            let mut provider = DiscogsExportProvider::new(&input.input);
            if let Some(username) = &input.username {
                provider = provider.with_username(username);
            }
            Box::new(provider)
        }
        InputFormat::Albums => Box::new(JsonFileProvider::new(&input.input)),
    };

    match &input.cache_dir {
        Some(dir) => {
            let cache = CollectionCache::open(dir)?;
            let cached =
                CachedProvider::new(provider.as_ref(), cache).force_refresh(input.refresh);
            Ok(cached.sync()?)
        }
        None => {
            let albums = provider.albums()?;
            let summary = CollectionSummary::from_albums(&albums, LoadOrigin::Source);
            Ok((albums, summary))
        }
    }
}

fn find_album<'a>(albums: &'a [Album], query: &AlbumQuery) -> anyhow::Result<&'a Album> {
    query
        .find(albums)
        .ok_or_else(|| anyhow!("{} is not in the collection", query))
}

fn print_fit_report(
    summary: &CollectionSummary,
    pipeline: &FittedPipeline,
    analysis: &FeatureAnalysis,
) {
    println!(
        "Albums: {} ({} artists, {} genres, {} labels)",
        summary.total_albums, summary.unique_artists, summary.unique_genres, summary.unique_labels
    );
    if let (Some(earliest), Some(latest)) = (summary.earliest_year, summary.latest_year) {
        println!("Years: {} - {}", earliest, latest);
    }

    println!();
    println!(
        "Features: {} (sparsity {:.1}%)",
        pipeline.n_features(),
        analysis.sparsity * 100.0
    );
    for block in &analysis.blocks {
        println!("  {:<8} {:>4} slots, {:>4} active", block.block, block.width, block.active);
    }

    let profile = pipeline.profile();
    println!();
    println!("Top genres:");
    for (genre, count) in &profile.favorite_genres {
        println!("  {:<30} {}", genre, count);
    }
    println!("Top artists:");
    for (artist, count) in profile.favorite_artists.iter().take(5) {
        println!("  {:<30} {}", artist, count);
    }
    let era = &profile.era_preference;
    println!(
        "Eras: classic {:.0}%, modern {:.0}%, contemporary {:.0}%",
        era.classic * 100.0,
        era.modern * 100.0,
        era.contemporary * 100.0
    );
    println!("Diversity: {:.2}", profile.diversity_score);

    println!();
    println!("Most variable features:");
    for (name, variance) in analysis.top_variable_features.iter().take(10) {
        println!("  {:<40} {:.4}", name, variance);
    }
}
