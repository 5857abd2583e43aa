mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use output::JsonLinesSink;
use serde_json::{Value, json};
use tracing::info;
use workerbridge::config::Config;
use workerbridge::host::{LocalHost, LocalItem};
use workerbridge::observability;
use workerbridge::pipeline::{Operation, Pipeline, params};
use workerbridge::transport::HttpClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path.clone())?,
        None => Config::load()?,
    };

    let host = build_host(&cli, &config)?;
    let pipeline = Pipeline::new(HttpClient::new(&config.http.to_http_config())?);
    let mut sink = JsonLinesSink::new(cli.output.clone());

    let result = pipeline.run(&host, &mut sink).await;

    let metrics = pipeline.metrics().snapshot();
    info!(
        succeeded = metrics.items_succeeded,
        failed = metrics.items_failed,
        submitted = metrics.executions_submitted,
        polls = metrics.polls_issued,
        files = metrics.files_downloaded,
        "Run summary"
    );

    result?;
    sink.finish()?;
    Ok(())
}

fn build_host(cli: &Cli, config: &Config) -> Result<LocalHost, AnyError> {
    let host = LocalHost::new(config.parameter_defaults())
        .with_continue_on_fail(cli.continue_on_fail || config.run.continue_on_fail);

    let host = match cli.command {
        Commands::Run(ref args) => host.with_items_file(&args.items)?,
        Commands::Status(ref args) => {
            host.with_item(shortcut(Operation::GetStatus, &args.execution_id, None))
        }
        Commands::Files(ref args) => {
            host.with_item(shortcut(Operation::ListFiles, &args.execution_id, None))
        }
        Commands::Download(ref args) => match args.file_name {
            Some(ref name) => host.with_item(shortcut(
                Operation::DownloadFile,
                &args.execution_id,
                Some(name),
            )),
            None => host.with_item(shortcut(Operation::DownloadAll, &args.execution_id, None)),
        },
    };

    Ok(host)
}

/// Single item for a read-only subcommand
fn shortcut(operation: Operation, execution_id: &str, file_name: Option<&str>) -> LocalItem {
    let mut item = LocalItem::default();
    item.params
        .insert(params::OPERATION.to_string(), json!(operation.to_string()));
    item.params.insert(
        params::EXECUTION_ID.to_string(),
        Value::String(execution_id.to_string()),
    );
    if let Some(name) = file_name {
        item.params
            .insert(params::FILE_NAME.to_string(), Value::String(name.to_string()));
    }
    item
}
