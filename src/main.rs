//! Syntexa CLI - keep your coding-problem approaches in sync from the terminal

use std::io;

use clap::{CommandFactory, Parser};
use env_logger::Env;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod session;

use cli::args::GlobalOptions;
use cli::config::ConfigChanges;
use cli::{CacheCommands, Cli, Commands, ConfigCommands, NoteCommands, ProblemCommands};
use error::Result;
use models::{NoteQuery, ProblemQuery};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    log::debug!("Syntexa CLI v{}", env!("CARGO_PKG_VERSION"));

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Signup {
            username,
            email,
            password,
        } => cli::auth::signup(&opts, username, email, password).await,
        Commands::Login { username, password } => cli::auth::login(&opts, username, password).await,
        Commands::Logout => cli::auth::logout(&opts),
        Commands::Status => cli::auth::status(&opts),
        Commands::Whoami => cli::auth::whoami(&opts).await,
        Commands::Refresh => cli::auth::refresh(&opts).await,
        Commands::Problem(cmd) => match cmd {
            ProblemCommands::List { search, limit } => {
                cli::problem::list(&opts, ProblemQuery { search, limit }).await
            }
            ProblemCommands::Get { id } => cli::problem::get(&opts, id).await,
            ProblemCommands::Create { title, description } => {
                cli::problem::create(&opts, title, description).await
            }
            ProblemCommands::Import { file } => cli::problem::import(&opts, &file).await,
        },
        Commands::Note(cmd) => match cmd {
            NoteCommands::Add { problem_id, body } => cli::note::add(&opts, problem_id, &body).await,
            NoteCommands::Update {
                problem_id,
                note_id,
                body,
            } => cli::note::update(&opts, problem_id, note_id, &body).await,
            NoteCommands::Delete {
                problem_id,
                note_id,
                yes,
            } => cli::note::delete(&opts, problem_id, note_id, yes).await,
            NoteCommands::Share {
                problem_id,
                note_id,
            } => cli::note::share(&opts, problem_id, note_id).await,
            NoteCommands::Mine {
                search,
                sort,
                problem,
                watch,
            } => {
                let query = NoteQuery {
                    search,
                    sort,
                    problem,
                };
                cli::note::mine(&opts, query, watch).await
            }
        },
        Commands::Cache(cmd) => {
            let format = opts.output_format(&opts.load_config()?);
            match cmd {
                CacheCommands::Status => cli::cache::status(format),
                CacheCommands::Clear => cli::cache::clear(format),
            }
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(&opts),
            ConfigCommands::Set {
                api_host,
                timeout,
                format,
                import_concurrency,
            } => cli::config::set(
                &opts,
                ConfigChanges {
                    api_host,
                    timeout,
                    format,
                    import_concurrency,
                },
            ),
        },
        Commands::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "syntexa", &mut io::stdout());
            Ok(())
        }
    }
}
