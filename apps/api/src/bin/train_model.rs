//! Offline trainer: fits the career random forest from a labeled CSV and
//! writes the JSON artifact the API loads at startup.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use career_api::classifier::training::{
    accuracy, classification_report, load_dataset, train_test_split,
};
use career_api::classifier::{Classifier, ForestParams, RandomForest};
use career_api::recommendation::careers::CareerKnowledgeBase;
use career_api::recommendation::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Parser)]
#[command(name = "train-model", version, about = "Train the career classifier")]
struct Args {
    /// Labeled dataset: 13 feature columns plus `career_code`.
    #[arg(long, default_value = "career_dataset.csv")]
    dataset: PathBuf,

    /// Where to write the model artifact.
    #[arg(long, default_value = "career_model.json")]
    output: PathBuf,

    #[arg(long, default_value_t = 100)]
    n_estimators: usize,

    #[arg(long)]
    max_depth: Option<usize>,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let n_classes = CareerKnowledgeBase::embedded()?.len();

    let dataset = load_dataset(&args.dataset)
        .with_context(|| format!("failed to load {}", args.dataset.display()))?;
    let (train, test) = train_test_split(&dataset, args.test_size, args.seed);
    info!("Train rows: {}, test rows: {}", train.len(), test.len());

    let params = ForestParams {
        n_estimators: args.n_estimators,
        max_depth: args.max_depth,
        seed: args.seed,
        ..ForestParams::default()
    };
    let model = RandomForest::fit(&train.features, &train.labels, n_classes, &params)?;

    let predictions: Vec<usize> = test
        .features
        .iter()
        .map(|row| {
            let mut v = [0.0; FEATURE_COUNT];
            v.copy_from_slice(row);
            model.predict(&FeatureVector(v))
        })
        .collect();

    println!(
        "Model Accuracy: {:.2} %",
        accuracy(&test.labels, &predictions) * 100.0
    );
    println!("\nClassification Report:");
    println!("{:>7} {:>10} {:>8} {:>8} {:>8}", "class", "precision", "recall", "f1", "support");
    for m in classification_report(&test.labels, &predictions, n_classes) {
        println!(
            "{:>7} {:>10.2} {:>8.2} {:>8.2} {:>8}",
            m.class, m.precision, m.recall, m.f1, m.support
        );
    }

    model.save(&args.output)?;
    println!("\nModel saved as {}", args.output.display());
    Ok(())
}
