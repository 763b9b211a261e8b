//! ch-glance - run statements against ClickHouse over HTTP.

mod cli;

use ch_glance::config::{Config, EndpointConfig};
use ch_glance::db::{self, ClickhouseClient, HttpTransport};
use ch_glance::error::{ClientError, Result};
use ch_glance::logging;
use ch_glance::output::CommandOutput;
use cli::{Cli, Command};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    match run(&cli).await {
        Ok(output) => println!("{}", output.render(cli.json)),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<CommandOutput> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let endpoint = resolve_connection(cli, &config)?;
    info!("Connection: {}", endpoint.display_string());

    let client = db::connect(&endpoint).await?;
    execute_command(&client, &cli.command).await
}

/// Resolves the final endpoint from CLI args, config file, and environment.
///
/// Precedence: CLI arguments, then the named connection, then the default
/// connection, then environment variables.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<EndpointConfig> {
    let mut connection = cli.to_endpoint_config()?;

    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            let mut named = config.get_connection(Some(name)).cloned().ok_or_else(|| {
                ClientError::config(format!("Connection '{}' not found in config file", name))
            })?;
            cli.apply_overrides(&mut named);
            connection = Some(named);
        }
    }

    if connection.is_none() {
        connection = config.get_connection(None).cloned().map(|mut conn| {
            cli.apply_overrides(&mut conn);
            conn
        });
    }

    let mut connection = connection.unwrap_or_else(|| {
        let mut conn = EndpointConfig::default();
        cli.apply_overrides(&mut conn);
        conn
    });
    connection.apply_env_defaults();

    Ok(connection)
}

async fn execute_command(
    client: &ClickhouseClient<HttpTransport>,
    command: &Command,
) -> Result<CommandOutput> {
    match command {
        Command::Query { sql } => Ok(CommandOutput::Table(client.query(sql).await?)),
        Command::Insert { sql, body_file } => {
            match body_file {
                Some(path) => {
                    let body = std::fs::read_to_string(path).map_err(|e| {
                        ClientError::config(format!("Failed to read {}: {}", path.display(), e))
                    })?;
                    client.insert_with_body(sql, body).await?;
                }
                None => client.insert(sql).await?,
            }
            Ok(CommandOutput::info("Ok."))
        }
        Command::Tables => Ok(CommandOutput::List(client.list_tables().await?)),
        Command::Describe { table } => {
            Ok(CommandOutput::Columns(client.describe_table(table).await?))
        }
        Command::Create { table } => Ok(CommandOutput::Text(
            client.show_create_table(table).await?,
        )),
        Command::Dump => Ok(CommandOutput::Text(client.dump_schema().await?)),
    }
}
