use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod app;
mod auth;
mod config;
mod home;
mod import_cmd;
mod llm;
mod rank_cmd;
mod tasks_cmd;

use app::App;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DAYBOOK_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "daybook", version = VERSION, about = "Task log with a daily priority ranking")]
struct Cli {
    /// Skip unreadable lines in tasks.jsonl when reading (add and import-state still refuse)
    #[arg(long, global = true, default_value_t = false)]
    skip_corrupt: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a task (tags are suggested remotely unless given)
    Add(tasks_cmd::AddArgs),

    /// List todo tasks
    List {
        /// Include done tasks
        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Ranked recommendations for today
    Today {
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Max items printed
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Every task with its score and ranking reason
    Scored {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Mark a task done
    Done { id: i64 },

    /// Import a daily journal: replace state.json and add its new_tasks
    ImportState {
        /// Journal JSON file
        path: Option<PathBuf>,

        /// Read the journal from stdin (model output with code fences is fine)
        #[arg(long, default_value_t = false, conflicts_with = "path")]
        paste: bool,
    },

    /// Show the current daily state
    State,

    /// Per-project progress
    Projects,

    /// Config file commands (~/.daybook/config.toml)
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Credentials for the remote model
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an OpenAI API key in ~/.daybook/auth.json
    PasteOpenaiApiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stderr keeps stdout clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
        Command::Auth { command } => match command {
            AuthCommand::PasteOpenaiApiKey => auth::openai_paste_api_key()?,
        },
        command => run(command, &App::load(cli.skip_corrupt)?)?,
    }

    Ok(())
}

fn run(command: Command, app: &App) -> Result<()> {
    match command {
        Command::Add(args) => tasks_cmd::add(app, args),
        Command::List { all } => tasks_cmd::list(app, all),
        Command::Today { json, limit } => rank_cmd::today(app, json, limit),
        Command::Scored { json } => rank_cmd::scored(app, json),
        Command::Done { id } => tasks_cmd::done(app, id),
        Command::ImportState { path, paste } => import_cmd::import_state(app, path, paste),
        Command::State => import_cmd::show_state(app),
        Command::Projects => tasks_cmd::projects(app),
        Command::Config { .. } | Command::Auth { .. } => Ok(()),
    }
}
