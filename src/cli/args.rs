use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::models::{BackendSelection, Filter, StoreConfig};

/// Top-level CLI entrypoint for `stringstore`.
#[derive(Parser, Debug)]
#[command(
    name = "stringstore",
    about = "Content-addressed store for analyzed strings",
    author = "stringstore developers",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    /// Print the JSON schema version used for `--format=json` output
    /// and exit.
    #[arg(long = "schema-version")]
    pub schema_version: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a string and store it.
    Add(AddArgs),
    /// Fetch a stored record by value.
    Get(GetArgs),
    /// Remove a stored record by value.
    Delete(DeleteArgs),
    /// List stored records matching structured filter flags.
    List(ListArgs),
    /// List stored records matching a natural-language query.
    Ask(AskArgs),
    /// Analyze a string without storing it.
    Analyze(AnalyzeArgs),
    /// Run a long-lived HTTP+JSON daemon.
    Serve(ServeArgs),
}

/// Storage flags shared by every subcommand that touches the store.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend to use (sqlite, flat, or auto).
    ///
    /// `auto` probes the SQLite engine at the store path and falls
    /// back to the flat backend when it cannot be opened.
    #[arg(long = "backend", value_enum)]
    pub backend: Option<StoreBackendArg>,

    /// Location of the on-disk store.
    ///
    /// For the SQLite backend this is a database file path such as
    /// ".stringstore/strings.sqlite". For the flat backend it is a
    /// JSON file path such as ".stringstore/strings.json".
    #[arg(long = "store-path")]
    pub store_path: Option<PathBuf>,

    /// Optional server URL for delegating the operation to a daemon.
    ///
    /// When set (either via this flag or the `STRINGSTORE_SERVER_URL`
    /// environment variable), the CLI sends the request to the HTTP
    /// server instead of opening the store locally. Use `--no-server`
    /// to override this and force local execution.
    #[arg(long = "server", env = "STRINGSTORE_SERVER_URL")]
    pub server: Option<String>,

    /// Disable use of any configured server and force local execution.
    #[arg(long = "no-server")]
    pub no_server: bool,
}

/// Arguments specific to the `add` subcommand.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// String value to analyze and store.
    pub value: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments specific to the `get` subcommand.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Stored value to fetch.
    pub value: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments specific to the `delete` subcommand.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Stored value to remove.
    pub value: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Arguments specific to the `list` subcommand.
///
/// Filter flags are accepted as raw strings so the lenient coercion
/// semantics of the filter layer apply unchanged: an unparseable
/// boolean or number simply does not restrict the result.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter on the palindrome property (true/false).
    #[arg(long = "palindrome")]
    pub palindrome: Option<String>,

    /// Inclusive minimum length.
    #[arg(long = "min-length")]
    pub min_length: Option<String>,

    /// Inclusive maximum length.
    #[arg(long = "max-length")]
    pub max_length: Option<String>,

    /// Exact word count.
    #[arg(long = "word-count")]
    pub word_count: Option<String>,

    /// Substring the value must contain.
    #[arg(long = "contains")]
    pub contains: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments specific to the `ask` subcommand.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Free-form query text, e.g. "all single word palindromic strings".
    pub text: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments specific to the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// String value to analyze.
    pub value: String,

    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments specific to the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket address to bind, e.g. "127.0.0.1:7878".
    #[arg(long = "addr", default_value = "127.0.0.1:7878")]
    pub addr: String,

    /// Storage backend to use (sqlite, flat, or auto).
    #[arg(long = "backend", value_enum)]
    pub backend: Option<StoreBackendArg>,

    /// Location of the on-disk store.
    #[arg(long = "store-path")]
    pub store_path: Option<PathBuf>,
}

/// CLI representation of output format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Table,
    Json,
}

/// CLI representation of the backend selection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendArg {
    Sqlite,
    Flat,
    Auto,
}

impl StoreBackendArg {
    pub fn to_model(self) -> BackendSelection {
        match self {
            StoreBackendArg::Sqlite => BackendSelection::Sqlite,
            StoreBackendArg::Flat => BackendSelection::Flat,
            StoreBackendArg::Auto => BackendSelection::Auto,
        }
    }
}

/// Default store file, per backend, under the project-local
/// `.stringstore/` directory.
fn default_store_path(backend: BackendSelection) -> PathBuf {
    match backend {
        BackendSelection::Flat => PathBuf::from(".stringstore/strings.json"),
        BackendSelection::Sqlite | BackendSelection::Auto => {
            PathBuf::from(".stringstore/strings.sqlite")
        }
    }
}

/// Resolve a `StoreConfig` from optional CLI/config inputs.
pub fn store_config_from_options(
    backend: Option<StoreBackendArg>,
    store_path: Option<PathBuf>,
) -> StoreConfig {
    let backend = backend
        .map(StoreBackendArg::to_model)
        .unwrap_or(BackendSelection::Sqlite);

    let path = store_path.unwrap_or_else(|| default_store_path(backend));

    StoreConfig { backend, path }
}

/// Build a filter from the structured `list` flags.
pub fn filter_from_list_args(args: &ListArgs) -> Filter {
    Filter {
        is_palindrome: args.palindrome.clone(),
        min_length: args.min_length.clone(),
        max_length: args.max_length.clone(),
        word_count: args.word_count.clone(),
        contains_character: args.contains.clone(),
    }
}
