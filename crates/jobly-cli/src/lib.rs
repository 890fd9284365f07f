mod cli;
mod commands;
mod config;

use cli::{Command, GlobalArgs};
use config::{ConfigFile, Settings};

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    let output = match cmd {
        Command::Help(topic) => {
            cli::print_help(topic);
            return Ok(());
        }
        Command::Jobs(global, cmd) => {
            let client = connect(&global).await?;
            commands::run_jobs(&client, cmd).await?
        }
        Command::Companies(global, cmd) => {
            let client = connect(&global).await?;
            commands::run_companies(&client, cmd).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_settings(global: &GlobalArgs) -> anyhow::Result<Settings> {
    let _ = dotenvy::dotenv();
    ConfigFile::load(&global.config)?
        .resolve(global.database.as_deref(), std::env::var("DATABASE_URL").ok())
}

/// Route `tracing` events (via its `log` bridge) to stderr.
fn init_logging(settings: &Settings) {
    let env = env_logger::Env::default().default_filter_or(settings.log_level.as_str());
    // Ignore repeated initialization.
    let _ = env_logger::Builder::from_env(env).try_init();
}

async fn connect(global: &GlobalArgs) -> anyhow::Result<jobly::pool::PooledClient> {
    let settings = load_settings(global)?;
    init_logging(&settings);
    tracing::debug!(max_connections = settings.max_connections, "creating pool");

    let pool = jobly::create_pool_with_config(&settings.database_url, settings.max_connections)?;
    Ok(pool.get().await?)
}
