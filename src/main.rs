//! testmqtt - Main Entry Point

use std::io;
use std::process::ExitCode;
use testmqtt::observability::init_default_logging;
use testmqtt::{Driver, MqttClientFactory, RunOutcome};
use tokio::signal;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_default_logging();

    let driver = Driver::new(MqttClientFactory);

    tokio::select! {
        result = driver.run(std::env::args_os(), io::stdout()) => match result {
            Ok(RunOutcome::UsageShown) => ExitCode::SUCCESS,
            Ok(RunOutcome::LoopEnded) => {
                info!("Network loop ended");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        },
        _ = signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            ExitCode::SUCCESS
        }
    }
}
