//! `snapkit` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and resolve process configuration.
//! - Wire core services to the terminal, `$EDITOR` and the local store.

mod console;

use clap::{Parser, Subcommand};
use console::TerminalConsole;
use log::{error, info};
use snapkit_core::config::LOG_LEVEL_ENV_VAR;
use snapkit_core::db::{open_db, Connection};
use snapkit_core::{
    default_log_level, init_logging, Application, AssertionService, ConfdbSchema, ConfdbSchemas,
    ExternalEditor, LoggingConfig, SessionConfig, SqliteConfdbSchemaStore,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_STORE_DB: &str = "snapkit-assertions.sqlite3";
const DEFAULT_GUI_DIR: &str = "meta/gui";

#[derive(Parser)]
#[command(name = "snapkit")]
#[command(about = "Edit store assertions and prime snap apps")]
struct Cli {
    /// Local assertion database.
    #[arg(long, global = true, default_value = DEFAULT_STORE_DB)]
    store_db: PathBuf,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rotated log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List confdb schemas in the local store.
    ListConfdbSchemas {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "table", value_name = "table|json")]
        format: String,
    },
    /// Edit a confdb schema, starting from a template when none exists.
    EditConfdbSchema {
        name: String,
        #[arg(long)]
        account_id: String,
    },
    /// Import confdb schemas from a YAML list.
    ImportConfdbSchemas { file: PathBuf },
    /// Prime one app entry and print the resulting metadata.
    PrimeApp {
        #[arg(long)]
        snap_name: String,
        #[arg(long)]
        app_name: String,
        /// YAML file holding the app entry.
        #[arg(long)]
        app_file: PathBuf,
        #[arg(long)]
        base: String,
        #[arg(long)]
        prime_dir: PathBuf,
        /// Desktop entry directory, relative to the prime dir.
        #[arg(long, default_value = DEFAULT_GUI_DIR)]
        gui_dir: PathBuf,
        /// Tooling chain entry to run ahead of the app's own chain.
        #[arg(long = "prepend-command-chain")]
        prepend_command_chain: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    start_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(cli: &Cli) {
    let level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var(LOG_LEVEL_ENV_VAR).ok())
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("snapkit-logs"));

    if let Err(err) = init_logging(&LoggingConfig::new(level, log_dir)) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::ListConfdbSchemas { name, format } => {
            let conn = open_db(&cli.store_db)?;
            let mut service = confdb_schema_service(&conn);
            service.list_assertions(&format, name.as_deref())?;
        }
        Commands::EditConfdbSchema { name, account_id } => {
            let conn = open_db(&cli.store_db)?;
            let mut service = confdb_schema_service(&conn);
            service.edit_assertion(&name, &account_id)?;
        }
        Commands::ImportConfdbSchemas { file } => {
            let count = import_confdb_schemas(&cli.store_db, &file)?;
            println!("Imported {count} confdb schemas.");
        }
        Commands::PrimeApp {
            snap_name,
            app_name,
            app_file,
            base,
            prime_dir,
            gui_dir,
            prepend_command_chain,
        } => {
            let source = std::fs::read_to_string(&app_file)?;
            let mut app = Application::from_yaml(app_name, &source)?;
            app.prepend_command_chain = prepend_command_chain;

            app.prime_commands(&base, &prime_dir)?;
            for path in app.write_command_wrappers(&prime_dir)? {
                info!("event=prime_app module=cli wrapper={}", path.display());
            }
            if let Some(desktop) = app.desktop_file(&snap_name, &prime_dir) {
                desktop.write(&gui_dir, None)?;
            }
            print!("{}", app.to_yaml()?);
        }
    }
    Ok(())
}

fn confdb_schema_service(
    conn: &Connection,
) -> AssertionService<
    ConfdbSchemas<SqliteConfdbSchemaStore<'_>>,
    TerminalConsole,
    ExternalEditor,
> {
    AssertionService::from_config(
        ConfdbSchemas::new(SqliteConfdbSchemaStore::new(conn)),
        TerminalConsole,
        &SessionConfig::from_env(),
    )
}

fn import_confdb_schemas(store_db: &Path, file: &Path) -> Result<usize, Box<dyn Error>> {
    let source = std::fs::read_to_string(file)?;
    let schemas: Vec<ConfdbSchema> = serde_yaml::from_str(&source)?;

    let conn = open_db(store_db)?;
    let store = SqliteConfdbSchemaStore::new(&conn);
    for schema in &schemas {
        store.insert_confdb_schema(schema)?;
    }
    info!("event=import module=cli status=ok count={}", schemas.len());
    Ok(schemas.len())
}
