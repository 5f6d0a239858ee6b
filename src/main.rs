use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dropout_risk_client::chat::{self, ChatHistoryStore, CLEARED_WELCOME_TEXT};
use dropout_risk_client::config::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_CHAT_URL, DEFAULT_DATABASE_URL, DEFAULT_TIMEOUT_SECS,
};
use dropout_risk_client::db::LocalStore;
use dropout_risk_client::gateway::{RemoteGateway, SignUpRequest};
use dropout_risk_client::models::{DashboardKind, Role};
use dropout_risk_client::resilience::{DemoNotice, ResilienceShim, ViewState};
use dropout_risk_client::session::SessionStore;
use dropout_risk_client::{dashboard, demo, report, RiskClient};

#[derive(Parser)]
#[command(name = "dropout-risk")]
#[command(about = "Student and counselor client for the dropout-risk platform", long_about = None)]
struct Cli {
    /// Auth and dashboard service
    #[arg(long, global = true, env = "RISK_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Support chat service
    #[arg(long, global = true, env = "RISK_CHAT_URL", default_value = DEFAULT_CHAT_URL)]
    chat_url: String,
    /// Local session and chat storage
    #[arg(long, global = true, env = "RISK_CLIENT_DB", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,
    #[arg(long, global = true, env = "RISK_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate semester records from a local CSV file
    Analyze {
        #[arg(long)]
        csv: PathBuf,
    },
    #[command(flatten)]
    Remote(RemoteCommand),
}

/// Commands that need local storage and the backend.
#[derive(Subcommand)]
enum RemoteCommand {
    /// Sign in with an email address or user id
    Signin {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: String,
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
    /// End the session on this device
    Logout,
    /// Request a password reset
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        new_password: String,
    },
    /// Show the signed-in profile
    Whoami {
        /// Ask the backend instead of reading the local session
        #[arg(long)]
        remote: bool,
    },
    /// Show the dashboard for the signed-in role
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// Write the dashboard as a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Talk to the support assistant
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
}

#[derive(Subcommand)]
enum ChatAction {
    /// Send a message and print the reply
    Send { message: String },
    /// Print the stored transcript
    History,
    /// Remove the stored transcript
    Clear,
}

fn parse_role(value: &str) -> Result<Role, String> {
    match value.to_lowercase().as_str() {
        "student" => Ok(Role::Student),
        "counselor" => Ok(Role::Counselor),
        other => Err(format!("unknown role '{other}'")),
    }
}

fn print_notice(notice: &DemoNotice) {
    eprintln!("{}: {}", notice.title, notice.message);
    eprintln!("Make sure you are signed in with the right role.");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig {
        api_base_url: cli.api_url,
        chat_base_url: cli.chat_url,
        database_url: cli.database_url,
        request_timeout: Duration::from_secs(cli.timeout_secs),
    };

    match cli.command {
        Commands::Analyze { csv } => analyze(&csv),
        Commands::Remote(command) => run(command, &config).await,
    }
}

fn analyze(csv: &Path) -> anyhow::Result<()> {
    let records = dashboard::records_from_csv(csv)
        .with_context(|| format!("failed to read {}", csv.display()))?;
    let analytics = dashboard::transform(&records)?;
    print!("{}", report::build_student_report(&analytics, false));
    Ok(())
}

async fn run(command: RemoteCommand, config: &ClientConfig) -> anyhow::Result<()> {
    let store = LocalStore::open(&config.database_url)
        .await
        .context("failed to open local storage")?;
    let gateway = RemoteGateway::new(config).context("failed to build HTTP client")?;
    let history = ChatHistoryStore::new(store.clone());
    let client = RiskClient::new(gateway, SessionStore::new(store.clone()));

    match command {
        RemoteCommand::Signin {
            identifier,
            password,
        } => {
            let response = client.sign_in(&identifier, &password).await?;
            println!("Signed in as {} ({}).", response.user.name, response.user.role);
        }
        RemoteCommand::Signup {
            name,
            email,
            password,
            role,
        } => {
            let response = client
                .sign_up(&SignUpRequest {
                    name,
                    email,
                    password,
                    role,
                })
                .await?;
            match response.get("userId").and_then(|id| id.as_str()) {
                Some(user_id) => println!("Account created. User ID: {user_id}"),
                None => println!("Account created."),
            }
        }
        RemoteCommand::Logout => {
            client.logout().await;
            println!("Signed out.");
        }
        RemoteCommand::ForgotPassword { email } => {
            let response = client.forgot_password(&email).await?;
            println!("Reset instructions sent to {email}.");
            if let Some(token) = response.reset_token {
                println!("Reset token: {token}");
            }
        }
        RemoteCommand::ResetPassword {
            token,
            new_password,
        } => {
            client.reset_password(&token, &new_password).await?;
            println!("Password updated. You can now sign in with your new password.");
        }
        RemoteCommand::Whoami { remote } => {
            let profile = if remote {
                Some(client.remote_profile().await?)
            } else {
                client.stored_profile().await?
            };
            match profile {
                Some(profile) => {
                    println!("{} ({}, {})", profile.name, profile.user_id, profile.role)
                }
                None => println!("Not signed in."),
            }
        }
        RemoteCommand::Dashboard { json } => {
            let role = client
                .stored_profile()
                .await?
                .map(|profile| profile.role)
                .unwrap_or_default();
            let rendered = render_dashboard(&client, role.dashboard(), json).await?;
            print!("{rendered}");
        }
        RemoteCommand::Report { out } => {
            let role = client
                .stored_profile()
                .await?
                .map(|profile| profile.role)
                .unwrap_or_default();
            let rendered = render_dashboard(&client, role.dashboard(), false).await?;
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
        RemoteCommand::Chat { action } => match action {
            ChatAction::Send { message } => {
                match chat::converse(client.gateway(), &history, &message).await? {
                    Some(reply) => println!("{}", reply.message),
                    None => println!("Nothing to send."),
                }
            }
            ChatAction::History => {
                for message in history.load_for_display().await? {
                    let speaker = if message.is_user { "You" } else { "Assistant" };
                    println!(
                        "[{}] {speaker}: {}",
                        message.timestamp.format("%H:%M"),
                        message.message
                    );
                }
            }
            ChatAction::Clear => {
                history.clear().await?;
                println!("{CLEARED_WELCOME_TEXT}");
            }
        },
    }

    store.close().await;
    Ok(())
}

async fn render_dashboard(
    client: &RiskClient,
    kind: DashboardKind,
    json: bool,
) -> anyhow::Result<String> {
    match kind {
        DashboardKind::Student => {
            let shim = ResilienceShim::new(demo::student_dashboard());
            let mut view = ViewState::default();
            let loaded = client.load_student_dashboard(&shim).await;
            if let Some(notice) = &loaded.notice {
                print_notice(notice);
            }
            view.apply(&shim, loaded);

            let loaded = view.current().context("dashboard load was discarded")?;
            if json {
                Ok(serde_json::to_string_pretty(&loaded.analytics)? + "\n")
            } else {
                Ok(report::build_student_report(&loaded.analytics, loaded.is_demo))
            }
        }
        DashboardKind::Counselor => {
            let shim = ResilienceShim::new(demo::counselor_dashboard());
            let mut view = ViewState::default();
            let loaded = client.load_counselor_dashboard(&shim).await;
            if let Some(notice) = &loaded.notice {
                print_notice(notice);
            }
            view.apply(&shim, loaded);

            let loaded = view.current().context("dashboard load was discarded")?;
            if json {
                Ok(serde_json::to_string_pretty(&loaded.analytics)? + "\n")
            } else {
                Ok(report::build_counselor_report(&loaded.analytics, loaded.is_demo))
            }
        }
    }
}
