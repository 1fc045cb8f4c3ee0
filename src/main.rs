use clap::Parser;
use spend_ledger::args::{Args, Command};
use spend_ledger::model::Confirmation;
use spend_ledger::{commands, Config, Result};
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().spend_home().path();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(
                &config,
                add_args.amount(),
                add_args.category(),
                add_args.note(),
            )
            .await?
            .print()
        }

        Command::List => commands::list(&Config::load(home).await?).await?.print(),

        Command::Totals => commands::totals(&Config::load(home).await?).await?.print(),

        Command::Range(range_args) => {
            let config = Config::load(home).await?;
            commands::range(&config, range_args.start(), range_args.end())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            let format = config.amount_format();
            let answer = delete_args.confirm().map(str::to_string);
            commands::delete(&config, delete_args.position(), |row| match answer {
                Some(answer) => Ok(Confirmation::from_answer(&answer)),
                None => commands::prompt_confirmation(
                    &mut io::stdin().lock(),
                    &mut io::stdout(),
                    row,
                    format,
                ),
            })
            .await?
            .print()
        }

        Command::Menu => {
            let config = Config::load(home).await?;
            commands::menu(&config, &mut io::stdin().lock(), &mut io::stdout())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the given level for the library and binary only.
            EnvFilter::new(format!(
                "spend_ledger={},{}={}",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
