use anyhow::Result;
use clap::Parser;
use gym_bridge_server::{Server, ServerConfig, Session, ZmqTransport};
use log::info;
use std::sync::atomic::Ordering;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Server configuration in YAML
    #[arg(long)]
    config: Option<String>,

    /// Endpoint to bind, e.g. tcp://*:10201
    #[arg(long)]
    address: Option<String>,

    /// Seed of the first environment instance
    #[arg(long)]
    seed: Option<u64>,

    /// Normalize rewards by the running standard deviation of the return
    #[arg(long, default_value_t = false)]
    normalize_reward: bool,
}

fn load_config(args: &Args) -> Result<ServerConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(address) = args.address.as_ref() {
        config = config.address(address.as_str());
    }
    if let Some(seed) = args.seed {
        config.session = config.session.seed(seed);
    }
    if args.normalize_reward {
        config.session = config.session.normalize_reward(true);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!("{:?}", config);

    let transport = ZmqTransport::bind(&config.address, config.poll_interval())?;
    let session = Session::new(gym_bridge_envs::registry(), config.session);
    let mut server = Server::new(transport, session);

    let running = server.running_flag();
    ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;

    server.serve()?;
    Ok(())
}
