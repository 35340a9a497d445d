use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use sim::{serve, spawn_motion_clock, RobotConfig, RobotModel, SimRobot};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulated robot controller for the urxui control panel.
#[derive(Parser, Debug)]
#[command(name = "sim", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port of the command interface
    #[arg(long, default_value_t = urx::drivers::DEFAULT_PORT)]
    port: u16,

    /// Arm model: ur3e, ur5e or ur10e
    #[arg(long, default_value_t = RobotModel::UR5e)]
    model: RobotModel,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let robot = Arc::new(Mutex::new(SimRobot::new(RobotConfig::from_model(args.model))));
    info!("Simulating a {}", args.model);

    spawn_motion_clock(Arc::clone(&robot));
    let listener = TcpListener::bind((args.bind.as_str(), args.port)).await?;
    serve(listener, robot).await
}
