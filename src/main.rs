// src/main.rs

use clap::Parser;
use pdlog::cli::{AssetsCommand, Cli, Commands};
use pdlog::commands;
use pdlog::config::Config;
use pdlog::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(default_filter: &str) {
    // Logs go to stderr so they never mix with command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let db_path = config.database_path(cli.db.as_deref())?;
    tracing::debug!(db = %db_path.display(), "resolved journal database");

    match cli.command {
        Commands::Init => commands::handle_init(config, &db_path),
        Commands::Add { message, tag, at } => commands::handle_add(&db_path, message, tag, at),
        Commands::List { query } => commands::handle_list(&db_path, query),
        Commands::Del { id } => commands::handle_del(&db_path, &id),
        Commands::Clear { yes } => commands::handle_clear(&db_path, yes),
        Commands::Export { out } => commands::handle_export(config, &db_path, out),
        Commands::Import { file } => commands::handle_import(&db_path, &file),
        Commands::Assets(AssetsCommand::Install {
            from,
            cache,
            name,
            cache_version,
            manifest,
        }) => commands::handle_assets_install(&from, &cache, &name, cache_version, manifest),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_filter);

    if let Err(e) = run(cli, &config) {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
