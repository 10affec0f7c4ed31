use clap::Parser;
use model_viewer::cli::Cli;
use model_viewer::shell;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let options = cli.options()?;
    log::info!("options: {}", serde_json::to_string(&options)?);
    shell::run(options, cli.startup())
}
