//! Interactive mode. One process, one session: the check result and the
//! feature toggles live as long as the shell does.

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::commands::{self, Command};
use crate::errors::ClientError;
use crate::routes::Route;
use crate::state::AppState;

const PROMPT: &str = "scholarcheck> ";

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Run(Command),
    /// Turn a check option on or off for later checks
    Set {
        #[arg(value_enum)]
        feature: Feature,
        #[arg(value_enum)]
        value: Switch,
    },
    /// Open a view by its path, e.g. `go /result`
    Go { path: String },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Feature {
    Ai,
    PublicData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

enum Step {
    Continue,
    Quit,
}

pub async fn run(state: &AppState) -> Result<(), ClientError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    println!("Type `help` for commands, `quit` to leave.");

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Help and usage errors both land here.
                let _ = e.print();
                continue;
            }
        };

        // Ctrl-C aborts the running command, not the shell. Dropping the
        // command future runs its cancellation guards.
        let step = tokio::select! {
            step = dispatch(state, parsed.command) => step,
            _ = tokio::signal::ctrl_c() => {
                warn!("command interrupted");
                println!("Interrupted.");
                Ok(Step::Continue)
            }
        };
        match step {
            Ok(Step::Quit) => return Ok(()),
            Ok(Step::Continue) => {}
            Err(e) => {
                let (code, message) = e.describe();
                eprintln!("error [{code}]: {message}");
            }
        }
    }
}

async fn dispatch(state: &AppState, command: ShellCommand) -> Result<Step, ClientError> {
    match command {
        ShellCommand::Run(command) => {
            commands::execute(state, command).await?;
        }
        ShellCommand::Set { feature, value } => {
            apply_switch(state, feature, value == Switch::On);
            debug!(?feature, ?value, "check option changed");
        }
        ShellCommand::Go { path } => {
            let route: Route = path
                .parse()
                .map_err(|e| ClientError::Validation(format!("{e}")))?;
            commands::show(state, route).await?;
        }
        ShellCommand::Quit => return Ok(Step::Quit),
    }
    Ok(Step::Continue)
}

fn apply_switch(state: &AppState, feature: Feature, on: bool) {
    let mut check = state.session.check();
    match feature {
        Feature::Ai => check.set_use_ai(on),
        Feature::PublicData => check.set_use_public_data(on),
    }
    println!(
        "AI analysis {}, public data {}",
        if check.use_ai() { "on" } else { "off" },
        if check.use_public_data() { "on" } else { "off" }
    );
}
