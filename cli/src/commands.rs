//! Command implementations over the shared API client.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

use campus_core::api::{self, Credentials, Registration};
use campus_core::config::API_BASE_PATH;
use campus_core::http::Method;
use campus_core::notify::LogNotifier;
use campus_core::{ApiClient, ApiError, ApiRequest, AppProfile, ClientConfig, SessionStore};
use serde_json::Value;

use crate::file_storage::FileStorage;
use crate::transport::ReqwestTransport;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid query parameter `{0}`; expected key=value")]
    InvalidQuery(String),
    #[error("not signed in; run `login` first")]
    NotSignedIn,
    #[error("failed to read password: {0}")]
    Io(#[from] io::Error),
}

/// Config for `profile` with the API rooted at `base_url`.
pub fn client_config(profile: AppProfile, base_url: &str) -> ClientConfig {
    let base = format!("{}{API_BASE_PATH}", base_url.trim_end_matches('/'));
    ClientConfig::for_profile(profile).with_base_path(base)
}

pub struct CliContext {
    pub client: ApiClient<ReqwestTransport>,
}

impl CliContext {
    pub fn new(profile: AppProfile, base_url: &str, state_file: &Path) -> Result<Self, CliError> {
        let config = client_config(profile, base_url);
        let storage = Arc::new(FileStorage::new(state_file));
        let session = SessionStore::load(storage, config.storage_keys.clone());
        let http = reqwest::Client::builder().build()?;
        let client = ApiClient::new(config, session, ReqwestTransport::new(http), Arc::new(LogNotifier));
        tracing::debug!(?profile, state_file = %state_file.display(), "cli context ready");
        Ok(Self { client })
    }
}

/// Split `key=value`. The value may itself contain `=`.
pub fn parse_query(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(CliError::InvalidQuery(raw.to_owned())),
    }
}

pub fn build_api_request(
    method: Method,
    path: &str,
    data: Option<&str>,
    query: &[String],
) -> Result<ApiRequest, CliError> {
    let mut request = ApiRequest::new(method, path);
    for raw in query {
        let (key, value) = parse_query(raw)?;
        request = request.query(key, value);
    }
    if let Some(data) = data {
        request = request.json(serde_json::from_str::<Value>(data)?);
    }
    Ok(request)
}

fn read_password(password: Option<String>) -> Result<String, CliError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("password: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

pub async fn run_login(ctx: &CliContext, username: String, password: Option<String>) -> Result<(), CliError> {
    let password = read_password(password)?;
    let grant = api::login(&ctx.client, &Credentials::new(username, password)).await?;
    print_json(&Value::Object(grant.user_info))
}

pub fn run_logout(ctx: &CliContext) {
    api::logout(&ctx.client);
    println!("signed out");
}

pub fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = ctx.client.session().snapshot();
    if !session.is_authenticated() {
        return Err(CliError::NotSignedIn);
    }
    print_json(&Value::Object(session.user_info))
}

pub async fn run_register(
    ctx: &CliContext,
    username: String,
    password: Option<String>,
    nickname: Option<String>,
) -> Result<(), CliError> {
    let password = read_password(password)?;
    let registration = Registration { username, password, nickname };
    let data = api::register(&ctx.client, &registration).await?;
    print_json(&data)
}

pub async fn run_user_info(ctx: &CliContext, id: &str) -> Result<(), CliError> {
    print_json(&api::user_info(&ctx.client, id).await?)
}

pub async fn run_admin_info(ctx: &CliContext) -> Result<(), CliError> {
    print_json(&api::admin_info(&ctx.client).await?)
}

pub async fn run_api(ctx: &CliContext, request: ApiRequest) -> Result<(), CliError> {
    print_json(&ctx.client.send(request).await?)
}
