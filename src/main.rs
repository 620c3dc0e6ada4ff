//! CLI for building feature stores and querying top-N matches

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use imatch::distance::DistanceMetric;
use imatch::feature::{ExtractContext, FeatureMethod, DEFAULT_BINS};
use imatch::imageio;
use imatch::rank::{rank, rank_hybrid, HybridParams, MatchRecord};
use imatch::store::{find_record, FeatureStore, StoreManifest};

#[derive(Parser)]
#[command(name = "imatch")]
#[command(about = "Content-based image retrieval", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Extraction methods reachable from the command line. The face-aware
/// method needs a caller-supplied detector and is library-only.
#[derive(ValueEnum, Clone, Copy)]
enum MethodArg {
    Baseline,
    Chistogram,
    Mhistogram,
    Texture,
    /// Look the query up in an already-populated store instead of
    /// extracting features from the image.
    External,
}

impl MethodArg {
    fn feature_method(self) -> Option<FeatureMethod> {
        match self {
            MethodArg::Baseline => Some(FeatureMethod::Baseline),
            MethodArg::Chistogram => Some(FeatureMethod::ColorHistogram),
            MethodArg::Mhistogram => Some(FeatureMethod::MultiHistogram),
            MethodArg::Texture => Some(FeatureMethod::TextureColor),
            MethodArg::External => None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract features for every image in a directory into a store
    Index {
        /// Directory of database images
        directory: String,
        /// Extraction method
        #[arg(short, long, value_enum)]
        method: MethodArg,
        /// Output store file
        #[arg(short, long)]
        output: String,
        /// Image file extension to pick up
        #[arg(long, default_value = "jpg")]
        extension: String,
        /// Histogram bins per axis
        #[arg(long, default_value_t = DEFAULT_BINS)]
        bins: usize,
    },
    /// Rank a store against a target image and print the top N matches
    Query {
        /// Target image path (or identifier, for --method external)
        target: String,
        /// Extraction method; must match the store
        #[arg(short, long, value_enum)]
        method: MethodArg,
        /// Store file to rank against
        #[arg(short, long)]
        store: String,
        /// Number of matches to print
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
        /// Histogram bins per axis (overridden by the store manifest)
        #[arg(long, default_value_t = DEFAULT_BINS)]
        bins: usize,
        /// Whole-image weight for the multi-histogram distance
        #[arg(long)]
        whole_weight: Option<f32>,
        /// Color weight for the texture-color distance
        #[arg(long)]
        color_weight: Option<f32>,
    },
    /// Rank by a weighted blend of an embedding table and a color table
    Hybrid {
        /// Target identifier, present in both tables
        target: String,
        /// Embedding store file
        #[arg(long)]
        embeddings: String,
        /// Color histogram store file
        #[arg(long)]
        colors: String,
        /// Number of matches to print
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
        /// Weight on the embedding distance
        #[arg(long)]
        embedding_weight: Option<f32>,
        /// Weight on the color histogram distance
        #[arg(long)]
        color_weight: Option<f32>,
    },
}

fn run_index(
    directory: &str,
    method: MethodArg,
    output: &str,
    extension: &str,
    bins: usize,
) -> Result<()> {
    let Some(feature_method) = method.feature_method() else {
        bail!("the external method reads a prebuilt store; it cannot index images");
    };

    let files = imageio::list_images(directory, extension)?;
    println!("Found {} images.", files.len());

    let store = FeatureStore::new(output);
    store.reset(&StoreManifest {
        method: feature_method.tag(),
        bins,
    })?;

    let ctx = ExtractContext::with_bins(bins);
    let mut written = 0usize;
    for path in &files {
        let grid = match imageio::decode(path) {
            Ok(grid) => grid,
            Err(e) => {
                eprintln!("warning: skipping {}: {}", path.display(), e);
                continue;
            }
        };
        match feature_method.extract(&grid, &ctx) {
            Ok(vector) => {
                store.append(&path.to_string_lossy(), &vector)?;
                written += 1;
            }
            Err(e) => {
                eprintln!("warning: extraction failed for {}: {}", path.display(), e);
            }
        }
    }

    println!("Wrote {} feature vectors to {}", written, output);
    Ok(())
}

fn run_query(
    target: &str,
    method: MethodArg,
    store_path: &str,
    count: usize,
    bins: usize,
    whole_weight: Option<f32>,
    color_weight: Option<f32>,
) -> Result<()> {
    let store = FeatureStore::new(store_path);
    let records = store
        .read_all()
        .with_context(|| format!("reading store {}", store_path))?;
    let manifest = store.manifest()?;

    let (query, bins) = match method.feature_method() {
        Some(feature_method) => {
            let manifest = manifest.with_context(|| {
                format!(
                    "store {} has no manifest; use --method external for raw tables",
                    store_path
                )
            })?;
            if manifest.method != feature_method.tag() {
                bail!(
                    "store {} holds {} features, not {}",
                    store_path,
                    manifest.method,
                    feature_method.tag()
                );
            }
            if manifest.bins != bins {
                eprintln!(
                    "note: using {} bins from the store manifest",
                    manifest.bins
                );
            }
            let grid = imageio::decode(target)?;
            let ctx = ExtractContext::with_bins(manifest.bins);
            (feature_method.extract(&grid, &ctx)?, manifest.bins)
        }
        None => {
            let query = find_record(&records, target)
                .with_context(|| format!("{} not found in store {}", target, store_path))?
                .clone();
            (query, bins)
        }
    };

    let mut metric = DistanceMetric::for_tag(query.method(), bins);
    if let (DistanceMetric::MultiHistogram { whole_weight: w }, Some(value)) =
        (&mut metric, whole_weight)
    {
        *w = value;
    }
    if let (DistanceMetric::TextureColor { color_weight: c, .. }, Some(value)) =
        (&mut metric, color_weight)
    {
        *c = value;
    }

    print_matches(&rank(&query, metric, &records, count));
    Ok(())
}

fn run_hybrid(
    target: &str,
    embeddings_path: &str,
    colors_path: &str,
    count: usize,
    embedding_weight: Option<f32>,
    color_weight: Option<f32>,
) -> Result<()> {
    let embeddings = FeatureStore::new(embeddings_path)
        .read_all()
        .with_context(|| format!("reading embedding store {}", embeddings_path))?;
    let colors = FeatureStore::new(colors_path)
        .read_all()
        .with_context(|| format!("reading color store {}", colors_path))?;

    let mut params = HybridParams::default();
    if let Some(w) = embedding_weight {
        params.embedding_weight = w;
    }
    if let Some(w) = color_weight {
        params.color_weight = w;
    }

    let results = rank_hybrid(target, &embeddings, &colors, &params, count)?;
    print_matches(&results);
    Ok(())
}

fn print_matches(results: &[MatchRecord]) {
    if results.is_empty() {
        println!("No matches found");
        return;
    }
    println!("The top {} image matches:", results.len());
    for (i, m) in results.iter().enumerate() {
        println!("{}. {} (distance: {:.4})", i + 1, m.id, m.distance);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            directory,
            method,
            output,
            extension,
            bins,
        } => run_index(&directory, method, &output, &extension, bins),
        Commands::Query {
            target,
            method,
            store,
            count,
            bins,
            whole_weight,
            color_weight,
        } => run_query(
            &target,
            method,
            &store,
            count,
            bins,
            whole_weight,
            color_weight,
        ),
        Commands::Hybrid {
            target,
            embeddings,
            colors,
            count,
            embedding_weight,
            color_weight,
        } => run_hybrid(
            &target,
            &embeddings,
            &colors,
            count,
            embedding_weight,
            color_weight,
        ),
    }
}
