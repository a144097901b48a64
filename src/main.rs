use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use review_responder::web::{self, AppState};
use review_responder::{Config, ModelGateway, ResponseRecord, ReviewPipeline};

#[derive(Parser, Debug)]
#[command(name = "review-responder")]
#[command(version = "0.1.0")]
#[command(about = "Classify customer reviews, diagnose complaints and draft replies")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the review assistant web app
    Serve {
        /// Address to listen on (overrides SERVER_ADDR)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Analyze reviews from the command line
    Analyze {
        /// Review text to analyze
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        review: Option<String>,

        /// File with one review per line
        #[arg(short, long)]
        file: Option<String>,

        /// Output format (json, text, markdown)
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("review_responder=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    // Fails here, before any review is read, when the provider key is missing
    let pipeline = ReviewPipeline::from_gateway(
        ModelGateway::global(),
        &config.model,
        config.ambiguity_policy,
    )?;
    tracing::info!(
        "Using {} ({}), ambiguous sentiment: {}",
        config.model.provider,
        pipeline.model_name(),
        pipeline.ambiguity_policy().as_str()
    );

    match args.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server_addr.clone());
            let state = AppState::new(
                std::sync::Arc::new(pipeline),
                config.model.provider.to_string(),
            )?;
            web::serve(&addr, state).await?;
        }
        Command::Analyze {
            review,
            file,
            format,
            output,
        } => {
            let rendered = match (review, file) {
                (Some(review), _) => analyze_one(&pipeline, &review, &format).await?,
                (None, Some(path)) => {
                    analyze_file(&pipeline, &path, &format, config.concurrency_limit).await?
                }
                (None, None) => anyhow::bail!("Provide a review or --file"),
            };
            write_output(&rendered, output.as_deref())?;
        }
    }

    Ok(())
}

async fn analyze_one(
    pipeline: &ReviewPipeline,
    review: &str,
    format: &str,
) -> anyhow::Result<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Processing review...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline.process_review(review).await;
    spinner.finish_and_clear();

    let record = result?;
    Ok(match format {
        "json" => serde_json::to_string_pretty(&record)?,
        "markdown" => format_markdown(review, &record),
        _ => format_text(&record),
    })
}

async fn analyze_file(
    pipeline: &ReviewPipeline,
    path: &str,
    format: &str,
    concurrency_limit: usize,
) -> anyhow::Result<String> {
    let contents = std::fs::read_to_string(path)?;
    let reviews: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    tracing::info!("Analyzing {} reviews from {}", reviews.len(), path);

    let pb = ProgressBar::new(reviews.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reviews")?
            .progress_chars("#>-"),
    );

    let results = pipeline
        .process_batch(reviews.clone(), concurrency_limit, || pb.inc(1))
        .await;
    pb.finish_with_message("Analysis complete");

    let failures = results.iter().filter(|r| r.is_err()).count();
    if failures > 0 {
        tracing::warn!("{} of {} reviews failed", failures, results.len());
    }

    let output = match format {
        "json" => {
            let entries: Vec<_> = reviews
                .iter()
                .zip(&results)
                .map(|(review, result)| match result {
                    Ok(record) => json!({ "review": review, "result": record }),
                    Err(e) => json!({
                        "review": review,
                        "error": e.to_string(),
                        "error_code": e.kind(),
                    }),
                })
                .collect();
            serde_json::to_string_pretty(&entries)?
        }
        "markdown" => reviews
            .iter()
            .zip(&results)
            .map(|(review, result)| match result {
                Ok(record) => format_markdown(review, record),
                Err(e) => format!("## Review\n\n> {}\n\n**Error:** {}\n", review, e),
            })
            .collect::<Vec<_>>()
            .join("\n---\n\n"),
        _ => reviews
            .iter()
            .zip(&results)
            .map(|(review, result)| match result {
                Ok(record) => format!("Review: {}\n{}", review, format_text(record)),
                Err(e) => format!("Review: {}\nError: {}\n", review, e),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };

    Ok(output)
}

fn write_output(output: &str, path: Option<&str>) -> anyhow::Result<()> {
    if let Some(path) = path {
        std::fs::write(path, output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }
    Ok(())
}

fn format_text(record: &ResponseRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Sentiment: {}\n",
        record.sentiment().as_str().to_uppercase()
    ));

    if let Some(diagnosis) = record.diagnosis() {
        output.push_str("Diagnosis:\n");
        output.push_str(&format!("  Issue Type: {}\n", diagnosis.issue_type()));
        output.push_str(&format!("  Tone: {}\n", diagnosis.tone()));
        output.push_str(&format!("  Urgency: {}\n", diagnosis.urgency()));
    }

    output.push_str(&format!("\nResponse:\n{}\n", record.response()));
    output
}

fn format_markdown(review: &str, record: &ResponseRecord) -> String {
    let mut output = String::new();

    output.push_str("## Review\n\n");
    output.push_str(&format!("> {}\n\n", review));
    output.push_str(&format!(
        "**Sentiment:** {}\n\n",
        record.sentiment().as_str().to_uppercase()
    ));

    if let Some(diagnosis) = record.diagnosis() {
        output.push_str("| Issue Type | Tone | Urgency |\n|------------|------|---------|\n");
        output.push_str(&format!(
            "| {} | {} | {} |\n\n",
            diagnosis.issue_type(),
            diagnosis.tone(),
            diagnosis.urgency()
        ));
    }

    output.push_str("### Response\n\n");
    output.push_str(record.response());
    output.push_str(&format!(
        "\n\n*Generated by {} on {}*\n",
        record.model(),
        record.generated_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}
