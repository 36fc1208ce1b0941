use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ali_torch::ali::{AliError, ModelBundle, Network, TrainingSession};
use ali_torch::config::{TrainArgs, TrainConfig};
use ali_torch::data::{DataLoader, load_dataset};
use ali_torch::nn::{Graph, Module};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(TrainArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: TrainArgs) -> Result<(), AliError> {
    let config = TrainConfig::from_args(args)?;
    info!(?config, "训练配置");
    config.warn_unsupported();
    config.save()?;

    let dataset = load_dataset(config.dataset, &config.dataroot, config.image_size)?;
    let loader = DataLoader::new(dataset, config.batch_size)?
        .shuffle(true)
        .seed(config.seed)
        .num_workers(config.workers);

    let graph = Graph::new_with_seed(config.seed);
    let models = ModelBundle::create(&graph, &config.arch())?;
    for network in models.iter() {
        info!(network = %network.kind(), params = network.num_elements()?, "网络已创建");
    }

    let mut session = TrainingSession::new(graph, models, config.session())?;
    for (&kind, path) in &config.pretrained {
        session.load_checkpoint(kind, path)?;
    }
    session.run(&loader)?;
    info!(experiment = %config.experiment.display(), "训练完成");
    Ok(())
}
