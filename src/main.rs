use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use asjc::classifier::download;
use asjc::classifier::onnx::OnnxClassifier;
use asjc::classifier::pipeline::MultiLabelPipeline;
use asjc::config::Config;

/// asjc: multi-label ASJC subject classification for scientific papers.
///
/// Feeds paper metadata (title, venue, abstract) to a fine-tuned SciBERT
/// model and prints every subject category whose probability clears the
/// threshold.
#[derive(Parser)]
#[command(name = "asjc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the ONNX classifier, tokenizer and config
    DownloadModel {
        /// HuggingFace repo to download from (default: ASJC_MODEL_REPO or the published model)
        #[arg(long)]
        repo: Option<String>,
    },

    /// Classify one metadata string
    Classify {
        /// Text to classify, e.g. "title={...}, container_title={...}, abstract={...}".
        /// Use `-` to read from stdin.
        text: String,

        /// Minimum probability to report (overrides ASJC_THRESHOLD and the model default)
        #[arg(long)]
        threshold: Option<f64>,

        /// Print predictions as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Classify the bundled example paper (a pharmacology systematic review)
    Example {
        /// Minimum probability to report (overrides ASJC_THRESHOLD and the model default)
        #[arg(long)]
        threshold: Option<f64>,

        /// Print predictions as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show model location, label count and the resolved threshold
    Status,
}

/// Metadata for "Dose optimization of β-lactams antibiotics in pediatrics and
/// adults: A systematic review". Expected labels: Pharmacology (medical), Pharmacology.
const EXAMPLE_TEXT: &str = concat!(
    "title={Dose optimization of β-lactams antibiotics in pediatrics and adults: A systematic review}, ",
    "container_title={Frontiers in Pharmacology}, ",
    "abstract={Background: β-lactams remain the cornerstone of the empirical therapy to treat various ",
    "bacterial infections. This systematic review aimed to analyze the data describing the dosing regimen ",
    "of β-lactams.Methods: Systematic scientific and grey literature was performed in accordance with ",
    "Preferred Items for Systematic Reviews and Meta-Analysis (PRISMA) guidelines. The studies were ",
    "retrieved and screened on the basis of pre-defined exclusion and inclusion criteria. The cohort ",
    "studies, randomized controlled trials (RCT) and case reports that reported the dosing schedule of ",
    "β-lactams are included in this study.Results: A total of 52 studies met the inclusion criteria, of ",
    "which 40 were cohort studies, 2 were case reports and 10 were RCTs. The majority of the studies ",
    "(34/52) studied the pharmacokinetic (PK) parameters of a drug. A total of 20 studies proposed dosing ",
    "schedule in pediatrics while 32 studies proposed dosing regimen among adults. Piperacillin (12/52) ",
    "and Meropenem (11/52) were the most commonly used β-lactams used in hospitalized patients. As per ",
    "available evidence, continuous infusion is considered as the most appropriate mode of administration ",
    "to optimize the safety and efficacy of the treatment and improve the clinical outcomes.Conclusion: ",
    "Appropriate antibiotic therapy is challenging due to pathophysiological changes among different age ",
    "groups. The optimization of pharmacokinetic/pharmacodynamic parameters is useful to support ",
    "alternative dosing regimens such as an increase in dosing interval, continuous infusion, and ",
    "increased bolus doses.}"
);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("asjc=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DownloadModel { repo } => {
            let config = Config::load()?;
            let repo = repo.unwrap_or_else(|| config.model_repo.clone());

            println!("Downloading classifier model...");
            println!("  Destination: {}", config.model_dir.display());

            download::download_model(&config.model_dir, &repo).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `asjc example` or `asjc classify \"...\"`.");
        }

        Commands::Classify {
            text,
            threshold,
            json,
        } => {
            let text = if text == "-" { read_stdin()? } else { text };
            if text.trim().is_empty() {
                anyhow::bail!("Nothing to classify: input text is empty");
            }
            run_classify(&text, threshold, json).await?;
        }

        Commands::Example { threshold, json } => {
            run_classify(EXAMPLE_TEXT, threshold, json).await?;
        }

        Commands::Status => {
            let config = Config::load()?;
            println!("Model directory: {}", config.model_dir.display());
            println!("Model repo: {}", config.model_repo);

            if !download::model_files_present(&config.model_dir) {
                println!("Model files: {}", "missing".yellow());
                println!("\nRun `asjc download-model` to fetch them.");
                return Ok(());
            }
            println!("Model files: {}", "present".green());

            let model_config = asjc::classifier::model_config::ModelConfig::load(
                &config.model_dir.join(download::CONFIG_FILE),
            )?;
            let labels = model_config.label_set()?;
            let threshold = asjc::Threshold::resolve(
                config.threshold_override(None),
                model_config.threshold,
            )?;
            println!("Labels: {}", labels.len());
            println!(
                "Threshold: {} ({})",
                threshold,
                threshold_source(config.threshold, model_config.threshold)
            );
        }
    }

    Ok(())
}

/// Load the classifier, build the pipeline with the resolved threshold, and
/// print what it predicts for `text`.
async fn run_classify(text: &str, cli_threshold: Option<f64>, json: bool) -> Result<()> {
    let config = Config::load()?;
    config.require_model()?;

    info!("Loading ONNX classifier from {}", config.model_dir.display());
    let model = OnnxClassifier::load(&config.model_dir)?;
    let pipeline = MultiLabelPipeline::new(Box::new(model), config.threshold_override(cli_threshold))?;

    let predictions = pipeline.classify(text).await?;
    info!(
        count = predictions.len(),
        threshold = pipeline.threshold().value(),
        "Classification complete"
    );

    if json {
        println!("{}", asjc::output::to_json(&predictions)?);
    } else {
        asjc::output::terminal::display_predictions(text, &predictions, pipeline.threshold());
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

/// Where the effective threshold came from, for `status`.
fn threshold_source(env: Option<f64>, model: Option<f64>) -> &'static str {
    match (env, model) {
        (Some(_), _) => "ASJC_THRESHOLD",
        (None, Some(_)) => "model config",
        (None, None) => "default",
    }
}
