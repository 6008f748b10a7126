//! CLI commands and argument parsing
//!
//! Job parameters use the upper-case names a Glue job receives them under
//! and can also be given through environment variables of the same name.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Incremental CSV to Parquet bucket sync
#[derive(Parser, Debug)]
#[command(name = "csv2parquet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Job name
    #[arg(long = "JOB_NAME", env = "JOB_NAME", global = true)]
    pub job_name: Option<String>,

    /// Job run id
    #[arg(long = "JOB_RUN_ID", env = "JOB_RUN_ID", global = true)]
    pub job_run_id: Option<String>,

    /// Bucket holding the CSV files (name or URL)
    #[arg(long = "INPUT_BUCKET", env = "INPUT_BUCKET", global = true)]
    pub input_bucket: Option<String>,

    /// Bucket receiving Parquet files (name or URL)
    #[arg(long = "OUTPUT_BUCKET", env = "OUTPUT_BUCKET", global = true)]
    pub output_bucket: Option<String>,

    /// Catalog database
    #[arg(long = "DATABASE", env = "DATABASE", global = true)]
    pub database: Option<String>,

    /// Workflow name
    #[arg(long = "WORKFLOW_NAME", env = "WORKFLOW_NAME", global = true)]
    pub workflow_name: Option<String>,

    /// Workflow run id
    #[arg(long = "WORKFLOW_RUN_ID", env = "WORKFLOW_RUN_ID", global = true)]
    pub workflow_run_id: Option<String>,

    /// Dataset list (YAML) replacing the built-in datasets
    #[arg(long, global = true)]
    pub datasets: Option<PathBuf>,

    /// Catalog file (YAML) used instead of the Glue Data Catalog
    #[arg(long, global = true)]
    pub catalog_file: Option<PathBuf>,

    /// Workflow properties file (JSON) used instead of Glue workflows
    #[arg(long, global = true)]
    pub workflow_file: Option<PathBuf>,

    /// AWS region for Glue
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Convert new partitions and publish the touched targets
    Run,

    /// Show new files without converting anything
    Diff,

    /// List the configured datasets
    Datasets,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glue_style_arguments() {
        let cli = Cli::try_parse_from([
            "csv2parquet",
            "--INPUT_BUCKET",
            "in",
            "--OUTPUT_BUCKET=out",
            "--DATABASE",
            "pfs_dev",
            "--WORKFLOW_NAME",
            "pfs",
            "--WORKFLOW_RUN_ID",
            "wr_1",
        ])
        .unwrap();

        assert_eq!(cli.input_bucket.as_deref(), Some("in"));
        assert_eq!(cli.output_bucket.as_deref(), Some("out"));
        assert_eq!(cli.database.as_deref(), Some("pfs_dev"));
        assert_eq!(cli.workflow_run_id.as_deref(), Some("wr_1"));
        assert_eq!(cli.command, None);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_subcommand_with_global_options() {
        let cli = Cli::try_parse_from([
            "csv2parquet",
            "diff",
            "--INPUT_BUCKET",
            "./in",
            "--format",
            "pretty",
            "--catalog-file",
            "catalog.yaml",
        ])
        .unwrap();

        assert_eq!(cli.command, Some(Commands::Diff));
        assert_eq!(cli.input_bucket.as_deref(), Some("./in"));
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert_eq!(cli.catalog_file, Some(PathBuf::from("catalog.yaml")));
    }
}
