//! The `grayzip run` command.

use clap::Args;
use grayzip_core::config::expand_path;
use grayzip_core::{Config, Pipeline};
use std::path::PathBuf;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// ZIP archive to extract
    #[arg(required = true)]
    pub archive: PathBuf,

    /// Extraction root; contents land in <DIR>/unzipped (defaults to config)
    #[arg(short = 'x', long, value_name = "DIR")]
    pub extract_to: Option<PathBuf>,

    /// Directory for grayscale images (defaults to config)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Maximum transforms in flight, 0 for no limit (defaults to config)
    #[arg(short = 'j', long)]
    pub max_concurrent: Option<usize>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    pub json: bool,
}

/// Directories and limits for one run, after applying config defaults.
#[derive(Debug, PartialEq)]
struct RunPlan {
    archive: PathBuf,
    extraction_root: PathBuf,
    output_root: PathBuf,
    max_concurrent: usize,
}

impl RunPlan {
    fn resolve(args: &RunArgs, config: &Config) -> Self {
        Self {
            archive: expand_path(&args.archive),
            extraction_root: args
                .extract_to
                .as_deref()
                .map(expand_path)
                .unwrap_or_else(|| config.extraction_root()),
            output_root: args
                .output
                .as_deref()
                .map(expand_path)
                .unwrap_or_else(|| config.output_root()),
            max_concurrent: args
                .max_concurrent
                .unwrap_or(config.transform.max_concurrent),
        }
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let plan = RunPlan::resolve(&args, &config);
    if !plan.archive.is_file() {
        anyhow::bail!("Archive not found: {}", plan.archive.display());
    }

    let pipeline = Pipeline::new(&config).with_max_concurrent(plan.max_concurrent);
    let summary = pipeline
        .run(&plan.archive, &plan.extraction_root, &plan.output_root)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Converted {} image(s) from {} into {}",
            summary.images,
            summary.archive.display(),
            summary.output_root.display()
        );
    }

    Ok(())
}
