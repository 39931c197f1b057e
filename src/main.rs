use clap::Parser;
use std::path::PathBuf;

use framefit::analyzer::{AnalysisOutcome, ImageAnalyzer};
use framefit::config::EngineConfig;
use framefit::prober::HttpProber;

/// Framefit - analyze an image resource and resolve its render policy
#[derive(Parser, Debug)]
#[command(name = "framefit")]
#[command(version, about, long_about = None)]
struct Args {
    /// Resource to analyze (HTTP/HTTPS URL; empty resolves the fallback policy)
    #[arg(default_value = "")]
    resource: String,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging subsystem
    framefit::logging::init_subscriber(args.json)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    // Load engine configuration (defaults when no file is given)
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }),
        None => EngineConfig::default(),
    };

    tracing::info!(
        resource = %args.resource,
        max_attempts = config.analysis.max_attempts,
        deadline_ms = config.analysis.deadline_ms,
        "Starting analysis"
    );

    let prober = HttpProber::new(&config.probe)?;
    let analyzer = ImageAnalyzer::new(prober, &config);
    let outcome = analyzer.analyze(&args.resource).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn outcome_json(outcome: &AnalysisOutcome) -> serde_json::Value {
    match outcome {
        AnalysisOutcome::Resolved {
            classification,
            policy,
        } => serde_json::json!({
            "outcome": "resolved",
            "classification": classification,
            "policy": policy,
        }),
        AnalysisOutcome::Fallback { policy } => serde_json::json!({
            "outcome": "fallback",
            "policy": policy,
        }),
        AnalysisOutcome::Error { reason, policy } => serde_json::json!({
            "outcome": "error",
            "reason": reason.to_string(),
            "reason_kind": reason.kind(),
            "policy": policy,
        }),
        AnalysisOutcome::Superseded => serde_json::json!({ "outcome": "superseded" }),
    }
}

fn print_outcome(outcome: &AnalysisOutcome) {
    match outcome {
        AnalysisOutcome::Resolved {
            classification,
            policy,
        } => {
            println!(
                "resolved: {} / {} (aspect {:.3}, compression {})",
                classification.family.as_str(),
                classification.quality.as_str(),
                classification.aspect_ratio,
                if classification.compression_needed {
                    "needed"
                } else {
                    "not needed"
                }
            );
            print_policy(policy);
        }
        AnalysisOutcome::Fallback { policy } => {
            println!("fallback: analysis did not complete");
            print_policy(policy);
        }
        AnalysisOutcome::Error { reason, policy } => {
            println!("error: {}", reason);
            print_policy(policy);
        }
        AnalysisOutcome::Superseded => println!("superseded"),
    }
}

fn print_policy(policy: &framefit::policy::RenderPolicy) {
    println!(
        "policy: fit={} anchor={} target={}x{} optimized={}",
        policy.fit.as_str(),
        policy.anchor.as_str(),
        policy.target_width,
        policy.target_height,
        policy.optimized
    );
}
