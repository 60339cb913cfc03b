//! Analyze command
//!
//! Scores every row of a client CSV through the prediction engine, the same
//! way `POST /analyze` does, without running the server.
//!
//! ```bash
//! wellnessz-gateway analyze --input clients.csv [--output scored.json] [--json]
//! ```

use crate::cli::AnalyzeArgs;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use wellnessz_gateway::gateway::config::engine_from_env;
use wellnessz_gateway::{AnalysisRecord, ClientSource, Dataset, HttpEngine, RequestOrchestrator};

/// Batch output written to file
#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    generated_at: DateTime<Utc>,
    input: String,
    records: &'a [AnalysisRecord],
}

/// Execute the analyze command
pub async fn execute(args: &AnalyzeArgs, json_output: bool) -> Result<()> {
    info!(input = %args.input.display(), "Starting batch analysis");

    let dataset = load_dataset(&args.input)?;
    info!(rows = dataset.len(), "Loaded client rows");

    let engine_config = engine_from_env().context("Invalid engine configuration")?;
    let engine = HttpEngine::new(engine_config)
        .map_err(|e| anyhow::anyhow!("Failed to create engine client: {}", e))?;

    let orchestrator = RequestOrchestrator::new(ClientSource::Disabled, Arc::new(engine));
    let records = orchestrator
        .analyze_batch(dataset.into_rows())
        .await
        .context("Batch analysis failed")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        output_console(&records);
    }

    if let Some(ref output_path) = args.output {
        let report = AnalysisReport {
            generated_at: Utc::now(),
            input: args.input.display().to_string(),
            records: &records,
        };
        fs::write(output_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        info!(output = %output_path.display(), "Analysis written to file");
    }

    Ok(())
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open client file: {}", path.display()))?;

    let dataset = Dataset::from_reader(file)
        .with_context(|| format!("Failed to parse client CSV: {}", path.display()))?;

    if dataset.is_empty() {
        anyhow::bail!("No client rows found in {}", path.display());
    }

    Ok(dataset)
}

fn output_console(records: &[AnalysisRecord]) {
    use colored::Colorize;
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct RecordRow {
        #[tabled(rename = "Client")]
        client_id: String,
        #[tabled(rename = "Triage")]
        triage: String,
        #[tabled(rename = "Focus")]
        control_focus: String,
        #[tabled(rename = "Distance")]
        health_distance: String,
        #[tabled(rename = "Diabetes")]
        diabetes: String,
        #[tabled(rename = "Blood Pressure")]
        blood_pressure: String,
        #[tabled(rename = "Lipids")]
        lipids: String,
    }

    println!();
    println!("{}", "WellnessZ Batch Analysis".bright_cyan().bold().underline());
    println!();

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            client_id: r.client_id.clone(),
            triage: colored_triage(&r.triage).to_string(),
            control_focus: r.control_focus.clone(),
            health_distance: format!("{:.2}", r.health_distance),
            diabetes: format!("{:.2}", r.risks.diabetes),
            blood_pressure: format!("{:.2}", r.risks.blood_pressure),
            lipids: format!("{:.2}", r.risks.lipids),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!();
    println!("{} {}", "Rows scored:".bold(), records.len().to_string().green());
}

fn colored_triage(triage: &str) -> colored::ColoredString {
    use colored::Colorize;

    match triage.to_lowercase().as_str() {
        "red" | "high" => triage.bright_red(),
        "amber" | "yellow" | "medium" => triage.yellow(),
        "green" | "low" => triage.bright_green(),
        _ => triage.normal(),
    }
}
