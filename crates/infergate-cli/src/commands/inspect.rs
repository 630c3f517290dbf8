//! Inspect command - load a model and report its tensor names.

use clap::Args;
use console::style;

use infergate_core::TensorNames;

use super::{build_adapter, load_deploy_config, EngineArgs};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    engine: EngineArgs,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_deploy_config(config_path)?;
    let declared = TensorNames::from_ir_config(config.ir_config())?.resolve();
    let (kind, mut adapter) = build_adapter(&args.engine, config).await?;

    println!("{} {}", style("Backend:").bold(), kind);
    println!("{} {}", style("Primary input:").bold(), declared.input_name);
    println!(
        "{} {}",
        style("Declared outputs:").bold(),
        declared.output_names.join(", ")
    );
    println!(
        "{} {}",
        style("Engine inputs:").bold(),
        adapter.input_names().join(", ")
    );
    println!(
        "{} {}",
        style("Engine outputs:").bold(),
        adapter.output_names().join(", ")
    );

    if let Some(releasable) = adapter.as_releasable() {
        releasable.release();
    }

    Ok(())
}
