use churn_serving::dataset::load_dataset;
use churn_serving::evaluation::evaluate_scores;
use churn_serving::models::ModelInfo;
use churn_serving::registry::RegistryStore;
use churn_serving::serving::{load_model, FeatureSchema, PredictionService};
use churn_serving::validation::validate_churn_dataset;
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "churn-cli")]
#[command(about = "Churn serving operational CLI", long_about = None)]
struct Cli {
    /// Server endpoint for the HTTP probes
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    /// Root of the file-backed tracking/registry store
    #[arg(short, long, default_value = "./mlruns", env = "CHURN__REGISTRY__ROOT")]
    registry_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the most recent run id of an experiment
    LatestRun {
        #[arg(short = 'x', long, default_value = "Telco Churn")]
        experiment: String,
    },

    /// Promote a run's model version to the Production stage
    Promote {
        #[arg(short, long)]
        run_id: String,

        #[arg(short, long, default_value = "telco-churn-model")]
        model_name: String,
    },

    /// Evaluate a run's model against a labelled test CSV
    Evaluate {
        #[arg(short, long)]
        run_id: String,

        #[arg(short, long)]
        test_data: PathBuf,

        /// Override the run's decision threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Skip writing evaluation metrics back into the run
        #[arg(long)]
        no_log: bool,
    },

    /// Run data-quality checks over a raw training CSV
    Validate {
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Check server health
    Health,

    /// Send a customer record (JSON file) to a running server
    Predict {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::LatestRun { experiment } => {
            let store = RegistryStore::new(&cli.registry_root);
            let run = store.latest_run(&experiment)?;
            println!("{}", run.run_id);
        }

        Commands::Promote { run_id, model_name } => {
            let store = RegistryStore::new(&cli.registry_root);
            let run = store.find_run(&run_id)?;
            println!("📦 Found run: {}", run.run_id);

            // Register the model only if this run has no version yet
            let version = match store.versions_for_run(&model_name, &run_id)?.first() {
                Some(existing) => {
                    println!("✅ Model version {} found in registry", existing.version);
                    existing.version
                }
                None => {
                    println!("📝 Registering model '{}'...", model_name);
                    let registered = store.register_model(&model_name, &run)?;
                    println!("✅ Model registered as version {}", registered.version);
                    registered.version
                }
            };

            println!("🚀 Promoting model version {} to Production...", version);
            let promoted = store.transition_stage(&model_name, version, "Production")?;
            println!(
                "✅ Model version {} promoted to {}",
                promoted.version, promoted.current_stage
            );
            println!("   Model URI: models:/{}/Production", model_name);
        }

        Commands::Evaluate {
            run_id,
            test_data,
            threshold,
            no_log,
        } => {
            let store = RegistryStore::new(&cli.registry_root);
            let run = store.find_run(&run_id)?;
            println!("📦 Evaluating model from run: {}", run.run_id);

            let artifacts = store.artifacts_dir(&run);
            let schema = FeatureSchema::load(&artifacts.join("feature_columns.txt"))?;
            let model = load_model(&artifacts.join("model"))?;

            let threshold = match threshold {
                Some(value) => value,
                None => store
                    .run_param(&run, "threshold")?
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(0.35),
            };

            // The same service the server runs, pointed at the run under
            // evaluation.
            let service = PredictionService::new(
                schema,
                model,
                threshold,
                ModelInfo {
                    model_name: "telco-churn-model".to_string(),
                    version: None,
                    run_id: Some(run.run_id.clone()),
                    resolved_via: "evaluation".to_string(),
                },
            );

            println!("📊 Loading test data from {}...", test_data.display());
            let dataset = load_dataset(&test_data)?;

            let mut probabilities = Vec::new();
            let mut labels = Vec::new();
            let mut unlabelled = 0usize;
            for row in &dataset.rows {
                let Some(label) = row.churn_label() else {
                    unlabelled += 1;
                    continue;
                };
                let features = service.transformer().transform_fields(&row.raw_fields());
                let prediction = service.predict_features(&features)?;
                probabilities.push(prediction.raw_prob);
                labels.push(label);
            }
            if unlabelled > 0 {
                eprintln!("⚠️  Skipped {} rows without a Churn label", unlabelled);
            }
            if labels.is_empty() {
                anyhow::bail!("no labelled rows in {}", test_data.display());
            }

            println!("🔮 Making predictions with threshold={}...", threshold);
            let report = evaluate_scores(&probabilities, &labels, threshold);
            let c = report.confusion;

            println!("\n📈 Evaluation Results:");
            println!(
                "   Precision: {:.4} | Recall: {:.4}",
                report.precision, report.recall
            );
            println!(
                "   F1 Score: {:.4} | ROC AUC: {:.4}",
                report.f1_score, report.roc_auc
            );
            println!(
                "   TP: {} | TN: {} | FP: {} | FN: {}",
                c.true_positives, c.true_negatives, c.false_positives, c.false_negatives
            );

            if !no_log {
                println!("\n💾 Logging evaluation metrics to run {}...", run.run_id);
                store.log_metric(&run, "eval_precision", report.precision)?;
                store.log_metric(&run, "eval_recall", report.recall)?;
                store.log_metric(&run, "eval_f1", report.f1_score)?;
                store.log_metric(&run, "eval_roc_auc", report.roc_auc)?;
                println!("✅ Metrics logged");
            }
        }

        Commands::Validate { data } => {
            println!("🔍 Validating {}...", data.display());
            let dataset = load_dataset(&data)?;
            let report = validate_churn_dataset(&dataset);

            if report.passed {
                println!(
                    "✅ Data validation PASSED: {}/{} checks successful",
                    report.checks_run, report.checks_run
                );
            } else {
                println!(
                    "❌ Data validation FAILED: {}/{} checks failed",
                    report.failures.len(),
                    report.checks_run
                );
                for failure in &report.failures {
                    println!("   - {}", failure);
                }
                std::process::exit(1);
            }
        }

        Commands::Health => {
            let client = Client::new();
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Predict { file } => {
            let client = Client::new();
            let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;

            let response = client
                .post(format!("{}/v1/predict", cli.endpoint))
                .json(&payload)
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
