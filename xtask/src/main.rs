//! Build automation tasks for SpamOps
//!
//! Currently generates the CLI command reference from the clap definitions.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for SpamOps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate CLI documentation in markdown format
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    // Generate markdown from clap definitions
    let markdown = clap_markdown::help_markdown::<spamops_cli::Cli>();

    let content = format!(
        r#"# SpamOps CLI Reference

This documentation is auto-generated from the CLI source code. Last updated: {}.

## Overview

SpamOps operates the spam/ham classifier pipeline: ETL with content-hash
dataset versioning, model training and registration, the evaluation gate
that promotes qualifying versions to Staging, and a smoke test against the
prediction service.

## Quick Start

```bash
# Clean and version the raw corpus
spamops etl

# Train on the versioned dataset the ETL run printed
spamops train /data/processed/<hash>/data.parquet

# Score the predictions and promote the model if it qualifies
spamops evaluate /data/processed/<hash>/data_with_preds.parquet

# Inspect the registry
spamops registry status

# Smoke-test the running prediction service
spamops predict "win a free prize now"
```

## Commands

{}

## Environment Variables

- `SPAMOPS_TRACKING_URI` - Tracking/registry server URL (default: `http://localhost:5000`)
- `SPAMOPS_RAW_DATA_PATH` - Raw corpus location (local path or `s3://` URI)
- `SPAMOPS_PROCESSED_DATA_BASE` - Base destination for versioned datasets
- `SPAMOPS_MODELS_BASE` - Base destination for model artifacts
- `SPAMOPS_F1_THRESHOLD` - Promotion gate threshold (default: `0.85`)
- `RUST_LOG` - Logging level (e.g., `debug`, `info`, `warn`, `error`)

---

*This documentation is automatically generated from the CLI source code. To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    // Create output directory if it doesn't exist
    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
