//! Startup sequence: credentials, login, then navigation.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use skythread_common::http_client::HttpClient;

use crate::client::CredentialSession;
use crate::config::{Credentials, LaunchOptions};
use crate::error::{Result, SkythreadError};
use crate::navigator::Navigator;
use crate::render::Console;

/// Run a whole session over `client` and `console`.
///
/// Fails only when the credentials cannot be used or login is rejected; once
/// logged in, every error is reported on the console and the loop goes on
/// until the user quits or input ends.
pub async fn run<C, R, W>(
    client: C,
    options: LaunchOptions,
    console: &mut Console<R, W>,
) -> Result<()>
where
    C: HttpClient + Send + Sync,
    R: BufRead,
    W: Write,
{
    let path = credentials_path(&options, console)?;
    let credentials = Credentials::load(&path)?;
    let config = options.resolve(&credentials);
    console.set_hyperlinks(config.hyperlinks);

    console.line("Logging in to Bluesky...")?;
    let session = CredentialSession::new(client, config.service.clone());
    let account = session
        .login(&credentials.username, &credentials.password)
        .await
        .map_err(SkythreadError::LoginFailed)?;
    tracing::info!(did = %account.did, handle = %account.handle, "logged in");
    console.line("Login successful!")?;

    Navigator::new(&session, console, &config)
        .start(credentials.bluesky_url.as_deref())
        .await
}

fn credentials_path<R, W>(options: &LaunchOptions, console: &mut Console<R, W>) -> Result<PathBuf>
where
    R: BufRead,
    W: Write,
{
    if let Some(path) = &options.credentials {
        return Ok(path.clone());
    }
    match console.prompt("Enter the credential file name (JSON format): ")? {
        Some(name) if !name.is_empty() => Ok(PathBuf::from(name)),
        _ => Err(SkythreadError::CredentialsInvalid {
            path: PathBuf::new(),
            reason: "no credentials file given".to_owned(),
        }),
    }
}
