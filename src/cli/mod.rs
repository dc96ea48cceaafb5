use std::net::SocketAddr;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};

use crate::analysis;
use crate::models::{ListResponse, Record, SearchResponse, RECORD_SCHEMA_VERSION};
use crate::query::natural;
use crate::server;
use crate::store;

mod args;
mod config;
mod format;
mod http_backend;

pub use args::{
    AddArgs, AnalyzeArgs, AskArgs, Cli, Commands, DeleteArgs, GetArgs, ListArgs, OutputFormat,
    ServeArgs, StoreArgs,
};

use config::{
    apply_format_default, apply_serve_defaults, apply_server_default, apply_store_defaults,
    load_cli_config, CliConfig,
};
use http_backend::HttpStoreBackend;

/// Entry point for the CLI binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.schema_version {
        println!("Record JSON schema version: {}", RECORD_SCHEMA_VERSION);
        return Ok(());
    }

    let cli_config = load_cli_config()?;

    match cli.command {
        Some(Commands::Add(mut add_args)) => {
            apply_common_defaults(&cli_config, &mut add_args.store, Some(&mut add_args.format));

            let value = normalized_value(&add_args.value)?;
            let record = if let Some(server_url) = effective_server_url(&add_args.store) {
                HttpStoreBackend::new(server_url)?.create(&value)?
            } else {
                let store_config =
                    args::store_config_from_options(add_args.store.backend, add_args.store.store_path);
                store::open_backend(&store_config)?.create(&value)?
            };

            print_record(&record, add_args.format)
        }
        Some(Commands::Get(mut get_args)) => {
            apply_common_defaults(&cli_config, &mut get_args.store, Some(&mut get_args.format));

            let value = normalized_value(&get_args.value)?;
            let record = if let Some(server_url) = effective_server_url(&get_args.store) {
                HttpStoreBackend::new(server_url)?.get(&value)?
            } else {
                let store_config =
                    args::store_config_from_options(get_args.store.backend, get_args.store.store_path);
                store::open_backend(&store_config)?.get(&value)?
            };

            print_record(&record, get_args.format)
        }
        Some(Commands::Delete(mut delete_args)) => {
            apply_common_defaults(&cli_config, &mut delete_args.store, None);

            let value = normalized_value(&delete_args.value)?;
            if let Some(server_url) = effective_server_url(&delete_args.store) {
                HttpStoreBackend::new(server_url)?.delete(&value)?;
            } else {
                let store_config = args::store_config_from_options(
                    delete_args.store.backend,
                    delete_args.store.store_path,
                );
                store::open_backend(&store_config)?.delete(&value)?;
            }

            println!("Deleted {value:?}");
            Ok(())
        }
        Some(Commands::List(mut list_args)) => {
            apply_common_defaults(&cli_config, &mut list_args.store, Some(&mut list_args.format));

            let filter = args::filter_from_list_args(&list_args);
            let response = if let Some(server_url) = effective_server_url(&list_args.store) {
                HttpStoreBackend::new(server_url)?.list(&filter)?
            } else {
                let store_config = args::store_config_from_options(
                    list_args.store.backend,
                    list_args.store.store_path,
                );
                let records = store::open_backend(&store_config)?.list(&filter)?;
                ListResponse {
                    count: records.len(),
                    records,
                }
            };

            print_records(&response.records, list_args.format, |records| {
                serde_json::to_writer(std::io::stdout(), &ListResponse {
                    count: records.len(),
                    records: records.to_vec(),
                })
                .map_err(Into::into)
            })
        }
        Some(Commands::Ask(mut ask_args)) => {
            apply_common_defaults(&cli_config, &mut ask_args.store, Some(&mut ask_args.format));

            let response = if let Some(server_url) = effective_server_url(&ask_args.store) {
                HttpStoreBackend::new(server_url)?.search(&ask_args.text)?
            } else {
                let filter = natural::extract_filter(&ask_args.text);
                if filter.is_empty() {
                    bail!("could not derive a filter from {:?}", ask_args.text);
                }

                let store_config =
                    args::store_config_from_options(ask_args.store.backend, ask_args.store.store_path);
                let records = store::open_backend(&store_config)?.list(&filter)?;
                SearchResponse {
                    query: ask_args.text.clone(),
                    count: records.len(),
                    filter,
                    records,
                }
            };

            if !matches!(ask_args.format, OutputFormat::Json) {
                println!(
                    "interpreted filter: {}",
                    serde_json::to_string(&response.filter)?
                );
            }

            print_records(&response.records, ask_args.format, |_| {
                serde_json::to_writer(std::io::stdout(), &response).map_err(Into::into)
            })
        }
        Some(Commands::Analyze(mut analyze_args)) => {
            if let Some(ref config) = cli_config {
                apply_format_default(config, &mut analyze_args.format);
            }

            let value = normalized_value(&analyze_args.value)?;
            let properties = analysis::analyze(&value);
            let response = crate::models::AnalyzeResponse { value, properties };

            match analyze_args.format {
                OutputFormat::Text | OutputFormat::Table => format::print_analysis_text(&response),
                OutputFormat::Json => {
                    serde_json::to_writer(std::io::stdout(), &response)?;
                    println!();
                    Ok(())
                }
            }
        }
        Some(Commands::Serve(mut serve_args)) => {
            if let Some(ref config) = cli_config {
                apply_serve_defaults(config, &mut serve_args.addr);
                apply_store_defaults(config, &mut serve_args.backend, &mut serve_args.store_path);
            }

            let store_config =
                args::store_config_from_options(serve_args.backend, serve_args.store_path);

            // Fail fast at startup when the configured backend cannot
            // be opened, instead of on the first request.
            let backend = store::open_backend(&store_config)?;
            println!(
                "Using {:?} backend at {}",
                backend.kind(),
                backend.store_path().display()
            );
            drop(backend);

            let addr: SocketAddr = serve_args.addr.parse()?;
            println!("Starting stringstore HTTP server on http://{addr}");

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;

            runtime.block_on(server::run(addr, store_config))?;
            Ok(())
        }
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn apply_common_defaults(
    cli_config: &Option<CliConfig>,
    store_args: &mut StoreArgs,
    format: Option<&mut OutputFormat>,
) {
    if let Some(config) = cli_config {
        apply_store_defaults(config, &mut store_args.backend, &mut store_args.store_path);
        apply_server_default(config, &mut store_args.server);
        if let Some(format) = format {
            apply_format_default(config, format);
        }
    }
}

fn normalized_value(raw: &str) -> Result<String> {
    match analysis::normalize_value(raw) {
        Some(value) => Ok(value),
        None => bail!("value must not be empty"),
    }
}

fn effective_server_url(store_args: &StoreArgs) -> Option<String> {
    if store_args.no_server {
        None
    } else {
        store_args.server.clone()
    }
}

fn print_record(record: &Record, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Text | OutputFormat::Table => format::print_record_text(record),
        OutputFormat::Json => {
            serde_json::to_writer(std::io::stdout(), record)?;
            println!();
            Ok(())
        }
    }
}

fn print_records<F>(records: &[Record], output: OutputFormat, write_json: F) -> Result<()>
where
    F: FnOnce(&[Record]) -> Result<()>,
{
    match output {
        OutputFormat::Text => format::print_records_text(records),
        OutputFormat::Table => format::print_records_table(records),
        OutputFormat::Json => {
            write_json(records)?;
            println!();
            Ok(())
        }
    }
}
