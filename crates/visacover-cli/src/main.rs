//! Command-line front end for the compliance engine.
//!
//! `evaluate` checks one (visa, product) pair; `matrix` runs the full
//! cross-product of two directories of JSON fact files, writing one result
//! per pair keyed `<visa_id>__<product_id>`. All file access lives here;
//! the engine itself only sees parsed records.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use visacover_core::{Product, Visa};
use visacover_engine::Engine;

#[derive(Parser, Debug)]
#[command(
    name = "visacover",
    about = "Check insurance products against visa route requirements",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one visa/product pair and print the result JSON
    Evaluate(EvaluateArgs),
    /// Evaluate the full cross-product of two fact directories
    Matrix(MatrixArgs),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Path to the visa facts JSON file
    #[arg(long)]
    visa: PathBuf,
    /// Path to the product facts JSON file
    #[arg(long)]
    product: PathBuf,
    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct MatrixArgs {
    /// Directory of visa facts JSON files
    #[arg(long)]
    visas: PathBuf,
    /// Directory of product facts JSON files
    #[arg(long)]
    products: PathBuf,
    /// Write one `<visa_id>__<product_id>.json` per pair instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Command::Evaluate(args) => run_evaluate(args),
        Command::Matrix(args) => run_matrix(args),
    }
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let visa = load_visa(&args.visa)?;
    let product = load_product(&args.product)?;

    let result = Engine::new().evaluate(&visa, &product);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");
    Ok(())
}

fn run_matrix(args: MatrixArgs) -> Result<()> {
    let visas = load_dir(&args.visas, load_visa)?;
    let products = load_dir(&args.products, load_product)?;
    info!(
        visas = visas.len(),
        products = products.len(),
        "evaluating cross-product"
    );

    if let Some(out) = &args.out {
        fs::create_dir_all(out)
            .with_context(|| format!("creating output directory {}", out.display()))?;
    }

    let engine = Engine::new();
    for visa in &visas {
        for product in &products {
            let result = engine.evaluate(visa, product);
            let key = format!("{}__{}", result.visa_id, result.product_id);
            match &args.out {
                Some(out) => {
                    let path = out.join(format!("{key}.json"));
                    fs::write(&path, serde_json::to_string_pretty(&result)?)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(%key, status = %result.status, "wrote mapping");
                }
                None => println!("{}", serde_json::to_string(&result)?),
            }
        }
    }
    Ok(())
}

fn load_visa(path: &Path) -> Result<Visa> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading visa facts {}", path.display()))?;
    Visa::from_json(&text).with_context(|| format!("parsing visa facts {}", path.display()))
}

fn load_product(path: &Path) -> Result<Product> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading product facts {}", path.display()))?;
    Product::from_json(&text).with_context(|| format!("parsing product facts {}", path.display()))
}

fn load_dir<T>(dir: &Path, load: impl Fn(&Path) -> Result<T>) -> Result<Vec<T>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // Stable input order keeps matrix runs reproducible.
    paths.sort();
    paths.iter().map(|p| load(p)).collect()
}
