//! `campus-cli`: terminal client for the campus marketplace backend.
//!
//! Uses the same session store and request pipeline as the browser apps, with
//! a reqwest transport and a JSON state file in place of `localStorage`.

mod commands;
mod file_storage;
mod transport;

use std::path::PathBuf;

use campus_core::AppProfile;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::commands::CliError;

#[derive(Parser, Debug)]
#[command(name = "campus-cli", about = "Campus marketplace API CLI")]
struct Cli {
    /// Which application's session and API dialect to use.
    #[arg(long, env = "CAMPUS_PROFILE", default_value = "consumer")]
    profile: AppProfile,

    #[arg(long, env = "CAMPUS_BASE_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    /// JSON file holding the persisted session.
    #[arg(long, env = "CAMPUS_STATE_FILE", default_value = ".campus-session.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        username: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Drop the persisted session.
    Logout,
    /// Print the persisted user record.
    Whoami,
    /// Create a consumer account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Fetch a user record by id.
    UserInfo { id: String },
    /// Fetch the signed-in administrator's record.
    AdminInfo,
    /// Issue an arbitrary request and print the envelope payload.
    Api(ApiArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Args, Debug)]
struct ApiArgs {
    method: ApiMethod,
    /// Path under `/api`, e.g. `/goods/list`.
    path: String,
    /// JSON request body.
    #[arg(long)]
    data: Option<String>,
    /// Query parameter as `key=value`; repeatable.
    #[arg(long = "query")]
    query: Vec<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = commands::CliContext::new(cli.profile, &cli.base_url, &cli.state_file)?;

    match cli.command {
        Command::Login { username, password } => commands::run_login(&ctx, username, password).await,
        Command::Logout => {
            commands::run_logout(&ctx);
            Ok(())
        }
        Command::Whoami => commands::run_whoami(&ctx),
        Command::Register { username, password, nickname } => {
            commands::run_register(&ctx, username, password, nickname).await
        }
        Command::UserInfo { id } => commands::run_user_info(&ctx, &id).await,
        Command::AdminInfo => commands::run_admin_info(&ctx).await,
        Command::Api(args) => {
            let method = match args.method {
                ApiMethod::Get => campus_core::http::Method::Get,
                ApiMethod::Post => campus_core::http::Method::Post,
                ApiMethod::Put => campus_core::http::Method::Put,
                ApiMethod::Delete => campus_core::http::Method::Delete,
            };
            let request = commands::build_api_request(method, &args.path, args.data.as_deref(), &args.query)?;
            commands::run_api(&ctx, request).await
        }
    }
}
