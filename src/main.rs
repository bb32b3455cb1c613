//! sqlconn - run SQL through the connector and print the cached result.

mod cli;
mod output;

use anyhow::{Context, Result};
use cli::{Cli, OutputFormat};
use sql_connector::config::{Config, ConnectionConfig};
use sql_connector::{is_select_command, logging, ConnectorError, Connector};
use tracing::{error, info};

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.verbose {
        logging::init_stderr_logging_with("sql_connector=debug,sqlconn=debug");
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = run(&cli) {
        match e.downcast_ref::<ConnectorError>() {
            Some(err) => error!("{}: {:#}", err.category(), e),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let format = cli.parse_output_format().map_err(anyhow::Error::msg)?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = resolve_connection(cli, &config)?.context(
        "No database connection configured. Use --help for usage information.",
    )?;

    let mut conn = Connector::with_config(connection);
    conn.connect()
        .with_context(|| format!("Cannot connect to {}", conn.config().display_string()))?;
    println!("SQL database connect success");

    conn.change_database(cli.use_database.as_deref())?;

    for sql in &cli.statements {
        conn.query(sql.as_str())
            .with_context(|| format!("Statement failed: {sql}"))?;
        if !is_select_command(sql) {
            println!("Query OK, {} rows affected", conn.affected_rows());
        }
    }

    let Some(cache) = conn.result_cache() else {
        return Ok(());
    };

    match format {
        OutputFormat::Text => print!("{}", output::render_text(cache, cli.width, cli.header)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output::render_json(cache))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    // 1. CLI arguments (highest)
    let mut connection = cli.to_connection_config()?;

    // 2. Named connection from config
    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = Some(
                config
                    .get_connection(Some(name))
                    .cloned()
                    .with_context(|| format!("Connection '{name}' not found in config file"))?,
            );
        }
    }

    // 3. Default connection from config
    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    // 4. Environment variables fill whatever is still unset
    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
