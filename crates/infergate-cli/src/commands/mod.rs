//! CLI subcommands.

pub mod backends;
pub mod config;
pub mod inspect;
pub mod run;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use infergate_core::{
    ArtifactSet, BackendFactory, BuildRequest, DeployConfig, EngineAdapter, EngineKind,
    EngineOptions, InferenceFacade, NativeProvider,
};

/// Engine selection shared by `inspect` and `run`.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Model artifacts, in the order the engine expects them
    #[arg(required = true)]
    artifacts: Vec<PathBuf>,

    /// Inference engine (defaults to backend_config.type of the deploy config)
    #[arg(short, long)]
    backend: Option<String>,

    /// Target device, e.g. cpu or cuda:0
    #[arg(short, long, default_value = "cpu")]
    device: String,

    /// Extra engine option as key=value (repeatable)
    #[arg(short = 'O', long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,
}

impl EngineArgs {
    fn kind(&self, config: &DeployConfig) -> anyhow::Result<EngineKind> {
        match (&self.backend, config.backend_config().kind) {
            (Some(name), _) => Ok(name.parse()?),
            (None, Some(kind)) => Ok(kind),
            (None, None) => anyhow::bail!(
                "No backend given. Pass --backend or set backend_config.type in the deploy config."
            ),
        }
    }

    fn artifacts(&self) -> ArtifactSet {
        ArtifactSet::new(self.artifacts.clone())
    }

    fn engine_options(&self) -> anyhow::Result<EngineOptions> {
        self.options
            .iter()
            .map(|pair| {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow::anyhow!("Invalid option '{}', expected KEY=VALUE", pair))?;
                Ok((key.to_string(), parse_value(value)))
            })
            .collect()
    }
}

/// JSON if it parses, otherwise a plain string.
pub fn parse_value(value: &str) -> serde_json::Value {
    serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()))
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("infergate")
        .join("deploy.json")
}

/// Deploy config from `--config`, else the default location, else defaults.
pub fn load_deploy_config(config_path: Option<&str>) -> anyhow::Result<DeployConfig> {
    if let Some(path) = config_path {
        return Ok(DeployConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using deploy config at {}", default_path.display());
        Ok(DeployConfig::from_file(&default_path)?)
    } else {
        Ok(DeployConfig::default())
    }
}

/// Build a facade on a blocking thread; engine loading can take a while.
pub async fn build_facade(
    args: &EngineArgs,
    config: DeployConfig,
) -> anyhow::Result<InferenceFacade> {
    let kind = args.kind(&config)?;
    let options = args.engine_options()?;
    let artifacts = args.artifacts();
    let device = args.device.clone();

    let facade = tokio::task::spawn_blocking(move || {
        let factory = BackendFactory::new(NativeProvider::new());
        let request = BuildRequest::new(kind, artifacts)
            .with_device(device)
            .with_deploy_config(&config)
            .with_options(options);
        InferenceFacade::new(&factory, request)
    })
    .await??;

    Ok(facade)
}

/// Build a bare adapter without declared tensor names, so it reports the
/// names found in the model graph.
pub async fn build_adapter(
    args: &EngineArgs,
    config: DeployConfig,
) -> anyhow::Result<(EngineKind, Box<dyn EngineAdapter>)> {
    let kind = args.kind(&config)?;
    let options = args.engine_options()?;
    let artifacts = args.artifacts();
    let device = args.device.clone();

    let adapter = tokio::task::spawn_blocking(move || {
        let factory = BackendFactory::new(NativeProvider::new());
        let request = BuildRequest::new(kind, artifacts)
            .with_device(device)
            .with_deploy_config(&config)
            .with_options(options);
        factory.build(request)
    })
    .await??;

    Ok((kind, adapter))
}
