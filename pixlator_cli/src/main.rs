// CLI entry for pixlator
use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueHint};
use log::info;
use pixlator::EngineConfig;
use pixlator::parallel_pipeline::{ClassifyJob, ParallelPipeline};
use pixlator::pipeline::{ClassifyRequest, GridDocument};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "pixlator",
    version,
    about = "Classify palette-indexed pixel grids into numbered groups"
)]
struct Cli {
    /// Numbering mode (top_to_bottom, bottom_to_top, diagonal_bottom_right, diagonal_bottom_left)
    #[arg(short = 'm', long = "mode")]
    mode: Option<String>,
    /// Longest side the grids were resized to
    #[arg(short = 'w', long = "width-bound")]
    width_bound: Option<u32>,
    /// Number of colors the grids were quantized to
    #[arg(short = 'k', long = "colors")]
    colors: Option<u32>,
    /// Write `<stem>.classified.json` files here instead of printing
    #[arg(short = 'o', long = "out-dir", value_hint = ValueHint::DirPath)]
    out_dir: Option<PathBuf>,
    /// Pretty-print the JSON
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    /// Grid documents (`{"palette": [[r,g,b],...], "grid": [[i,...],...]}`)
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,
}

fn build_request(cli: &Cli, config: &EngineConfig) -> Result<ClassifyRequest> {
    let defaults = ClassifyRequest::from_config(config);
    let mode = cli
        .mode
        .clone()
        .unwrap_or_else(|| defaults.numbering_mode.to_string());
    let request = ClassifyRequest::parse(
        cli.width_bound.unwrap_or(defaults.width_bound),
        cli.colors.or(defaults.color_count_hint),
        &mode,
    )?;
    request.validate(config)?;
    Ok(request)
}

fn read_document(path: &Path) -> Result<GridDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn output_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "grid".to_string());
    dir.join(format!("{stem}.classified.json"))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = EngineConfig::from_env().context("loading PIXLATOR_* configuration")?;
    let request = build_request(&cli, &config)?;

    let mut jobs = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let (grid, palette) = read_document(path)?
            .into_parts()
            .with_context(|| format!("invalid grid in {}", path.display()))?;
        jobs.push(ClassifyJob::new(request, grid, palette));
    }

    if let Some(dir) = &cli.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let pipeline = ParallelPipeline::new(config);
    let results = pipeline.process_batch(jobs).await;
    pipeline.shutdown().await;

    for (path, outcome) in cli.inputs.iter().zip(results) {
        let result = match outcome {
            Ok(result) => result,
            Err(err) => bail!("{}: {}", path.display(), err),
        };
        let json = result.to_json(cli.pretty)?;
        match &cli.out_dir {
            Some(dir) => {
                let target = output_path(dir, path);
                fs::write(&target, json).with_context(|| format!("writing {}", target.display()))?;
                info!("{} -> {}", path.display(), target.display());
            }
            None => println!("{json}"),
        }
    }
    Ok(())
}
