//! The command tree shared by the CLI and the interactive shell, and the code
//! that runs each command against `AppState` and prints its view.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;

use crate::admin::{self, AdminApi, AdminConsole, AdminEntry, CsvFile, Flag};
use crate::auth;
use crate::check::{submit_check, CheckArgs};
use crate::errors::ClientError;
use crate::models::admin::UploadMode;
use crate::models::scholarship::{ApiStatus, ScholarshipPage};
use crate::models::user::Provider;
use crate::result::{open_detail, result_view};
use crate::routes::Route;
use crate::state::AppState;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check eligibility and show the results
    Check(CheckArgs),
    /// Show the results of the last check in this session
    Result,
    /// Show one scholarship in full
    Detail { id: String },
    /// List scholarships
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// List scholarships imported from public data
    Public {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    /// List featured scholarships
    Featured,
    /// List scholarships accepting applications now
    Accepting,
    /// Show your past checks
    History,
    /// Show which backend features are available
    Status,
    /// Log in through a social provider
    Login {
        #[arg(value_enum)]
        provider: Provider,
    },
    /// Show your profile
    Me,
    /// Renew the access token
    Refresh,
    /// Log out
    Logout,
    /// Administrator commands
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Interactive session; check results persist between commands
    Shell,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
    /// Log in as administrator
    Login {
        #[arg(long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "SCHOLARCHECK_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the administrator session
    Logout,
    /// Show counters and the scholarship table
    Dashboard,
    /// Flip one flag of one scholarship
    Toggle {
        id: String,
        #[arg(value_enum)]
        flag: Flag,
    },
    /// Upload scholarship data from a CSV file
    Upload {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = UploadMode::Append)]
        mode: UploadMode,
    },
}

pub async fn execute(state: &AppState, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Check(args) => {
            let route = submit_check(&state.api, &state.session, args.to_request()).await?;
            show(state, route).await
        }
        Command::Result => show(state, Route::Result).await,
        Command::Detail { id } => show(state, Route::Detail(id)).await,
        Command::List {
            page,
            per_page,
            search,
        } => {
            let listing = state
                .api
                .list_scholarships(page, per_page, search.as_deref())
                .await?;
            print_listing("Scholarships", &listing);
            Ok(())
        }
        Command::Public { page, per_page } => {
            let listing = state.api.public_scholarships(page, per_page).await?;
            print_listing("Public-data scholarships", &listing);
            Ok(())
        }
        Command::Featured => {
            print_listing("Featured", &state.api.featured_scholarships().await?);
            Ok(())
        }
        Command::Accepting => {
            print_listing("Accepting applications", &state.api.accepting_scholarships().await?);
            Ok(())
        }
        Command::History => {
            println!("{:#}", state.api.check_history().await?);
            Ok(())
        }
        Command::Status => {
            print_status(&state.api.api_status().await?);
            Ok(())
        }
        Command::Login { provider } => {
            println!("Open this address in your browser to log in:");
            println!("  {}", state.api.login_url(provider)?);
            let token = auth::wait_for_token(state.config.callback_port, state.config.login_timeout)
                .await?;
            let route = auth::complete_oauth(&state.session, token)?;
            show(state, route).await
        }
        Command::Me => show(state, Route::MyPage).await,
        Command::Refresh => {
            auth::refresh(&state.api).await?;
            println!("Access token renewed.");
            Ok(())
        }
        Command::Logout => {
            let route = auth::logout(&state.api).await?;
            println!("Logged out.");
            show(state, route).await
        }
        Command::Admin(command) => execute_admin(state, command).await,
        Command::Shell => Err(ClientError::Validation(
            "Already in an interactive session.".to_string(),
        )),
    }
}

async fn execute_admin(state: &AppState, command: AdminCommand) -> Result<(), ClientError> {
    match command {
        AdminCommand::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            let route = auth::admin_login(&state.api, &username, &password).await?;
            println!("Logged in as {username}.");
            show(state, route).await
        }
        AdminCommand::Logout => {
            let route = auth::admin_logout(&state.session)?;
            println!("Administrator session cleared.");
            show(state, route).await
        }
        AdminCommand::Dashboard => show(state, Route::Admin).await,
        AdminCommand::Toggle { id, flag } => {
            let Some(mut console) = open_admin(state).await? else {
                return Ok(());
            };
            let result = console.toggle(&id, flag).await;
            admin_outcome(result, |outcome| {
                println!("{} {} -> {}", outcome.id, outcome.flag.name(), outcome.value);
                print!("{console}");
            })
        }
        AdminCommand::Upload { file, mode } => {
            // Read before touching the network: a bad path makes no request.
            let csv = CsvFile::read(&file).await?;
            let Some(mut console) = open_admin(state).await? else {
                return Ok(());
            };
            console.upload().select(csv);
            console.upload().set_mode(mode);
            let result = console.upload_selected().await;
            admin_outcome(result, |report| {
                print!("{report}");
                if let Some(stats) = console.stats() {
                    println!(
                        "Now {} scholarships ({} active).",
                        stats.total_scholarships, stats.active_scholarships
                    );
                }
            })
        }
    }
}

/// Opens the view a flow resolved to.
pub async fn show(state: &AppState, route: Route) -> Result<(), ClientError> {
    match route {
        Route::Result => {
            print!("{}", result_view(&state.session.check()));
        }
        Route::Detail(id) => {
            print!("{}", open_detail(&state.api, &id).await);
        }
        Route::MyPage => {
            print!("{}", auth::profile(&state.api).await?);
        }
        Route::Admin => {
            if let Some(console) = open_admin(state).await? {
                print!("{console}");
            }
        }
        other => println!("Next: {}", other.command()),
    }
    Ok(())
}

async fn open_admin(state: &AppState) -> Result<Option<AdminConsole>, ClientError> {
    let api: Arc<dyn AdminApi> = Arc::new(state.api.clone());
    match admin::open_console(api, &state.session).await? {
        AdminEntry::Console(console) => Ok(Some(console)),
        AdminEntry::Redirect(route) => {
            println!("Administrator login required. Run: {}", route.command());
            Ok(None)
        }
    }
}

// A rejected admin session is an outcome with a next step, not a failure.
fn admin_outcome<T>(
    result: Result<T, ClientError>,
    on_success: impl FnOnce(T),
) -> Result<(), ClientError> {
    match result {
        Ok(value) => {
            on_success(value);
            Ok(())
        }
        Err(e) => match admin::login_redirect(&e) {
            Some(route) => {
                println!("{} Run: {}", e.user_message(), route.command());
                Ok(())
            }
            None => Err(e),
        },
    }
}

fn prompt(label: &str) -> Result<String, ClientError> {
    eprint!("{label}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_listing(title: &str, listing: &ScholarshipPage) {
    println!("{title}");
    if listing.scholarships.is_empty() {
        println!("  (none)");
    }
    for s in &listing.scholarships {
        let org = s.organization.as_deref().unwrap_or("-");
        let period = match (&s.apply_start, &s.apply_end) {
            (None, None) => String::new(),
            (start, end) => format!(
                "  [{} ~ {}]",
                start.as_deref().unwrap_or(""),
                end.as_deref().unwrap_or("")
            ),
        };
        println!("  {}  {} / {org}{period}", s.id, s.name);
    }
    if let (Some(page), Some(pages)) = (listing.page, listing.total_pages) {
        println!("Page {page} of {pages}");
    }
    if let Some(total) = listing.total {
        println!("{total} in total");
    }
}

fn print_status(status: &ApiStatus) {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    println!("Public data: {}", on_off(status.public_data_api.enabled));
    println!("AI analysis: {}", on_off(status.ai_analysis.enabled));
    println!(
        "Login providers: kakao {}, naver {}, google {}",
        on_off(status.oauth.kakao),
        on_off(status.oauth.naver),
        on_off(status.oauth.google)
    );
}
