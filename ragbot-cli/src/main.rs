use clap::Parser;
use ragbot_cli::{Cli, commands, telemetry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    commands::run(cli).await
}
