mod cli;
mod commands;
mod logging;
mod sources;

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("compute error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let config = commands::load_config(args.config.as_deref())?;
    commands::run(args.command, config).await
}
