//! Run command - feed a tensor through a model.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use infergate_core::{BackendModel, ClassificationModel, NamedTensor, Tensor};

use super::{build_facade, load_deploy_config, EngineArgs};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Input tensor as JSON: {"shape": [...], "data": [...]}
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Treat the model as a classifier and print the top K classes
    #[arg(long, value_name = "K")]
    top_k: Option<usize>,

    /// Class labels file, one per line (with --top-k)
    #[arg(long)]
    labels: Option<PathBuf>,
}

/// Float32 tensor read from disk.
#[derive(Debug, Deserialize)]
struct TensorFile {
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// One output tensor, as printed.
#[derive(Debug, Serialize)]
struct OutputRecord {
    name: String,
    dtype: String,
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl From<&NamedTensor> for OutputRecord {
    fn from((name, tensor): &NamedTensor) -> Self {
        Self {
            name: name.clone(),
            dtype: tensor.dtype().to_string(),
            shape: tensor.shape().to_vec(),
            data: tensor.to_f64_vec(),
        }
    }
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let input: TensorFile = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
    debug!("Input tensor shape {:?}", input.shape);

    let config = load_deploy_config(config_path)?;
    let facade = build_facade(&args.engine, config).await?;

    let output = match args.top_k {
        Some(top_k) => {
            let labels = match &args.labels {
                Some(path) => fs::read_to_string(path)?
                    .lines()
                    .map(|l| l.trim().to_string())
                    .collect(),
                None => Vec::new(),
            };
            let image = to_nchw(input)?;

            tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
                let mut model = ClassificationModel::new(facade)
                    .with_labels(labels)
                    .with_top_k(top_k);
                let predictions = model.forward(image)?;

                let mut buf = Vec::new();
                model.show_result(&predictions, &mut buf)?;
                model.destroy();
                Ok(String::from_utf8(buf)?)
            })
            .await??
        }
        None => {
            let tensor = Tensor::from_f32(input.data, &input.shape)?;

            let outputs = tokio::task::spawn_blocking(move || {
                let mut facade = facade;
                let outputs = facade.invoke_input(tensor);
                facade.destroy();
                outputs
            })
            .await??;

            let records: Vec<OutputRecord> = outputs.iter().map(OutputRecord::from).collect();
            serde_json::to_string_pretty(&records)?
        }
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    info!("Run finished in {:?}", start.elapsed());

    Ok(())
}

fn to_nchw(input: TensorFile) -> anyhow::Result<Array4<f32>> {
    let [n, c, h, w] = input.shape[..] else {
        anyhow::bail!(
            "Classification input must be NCHW (4 dimensions), got shape {:?}",
            input.shape
        );
    };
    Ok(Array4::from_shape_vec((n, c, h, w), input.data)?)
}
