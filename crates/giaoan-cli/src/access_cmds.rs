//! CLI handlers for `giaoan login`, `giaoan logout` and `giaoan api-key`.

use std::io::BufRead;

use anyhow::{Context, Result};

use giaoan_core::access::{AccessGate, fetch_credentials};
use giaoan_store::queries::api_key;

use crate::ApiKeyCommands;
use crate::app;
use crate::config::GiaoanConfig;

/// Read one trimmed line from stdin.
fn read_stdin_line(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

// -----------------------------------------------------------------------
// giaoan login / logout
// -----------------------------------------------------------------------

pub async fn run_login(config: &GiaoanConfig, username: &str, password: Option<String>) -> Result<()> {
    let Some(url) = config.credentials_url.as_deref() else {
        println!("Login is not required: no credentials URL is configured.");
        return Ok(());
    };

    let password = match password {
        Some(password) => password,
        None => read_stdin_line("Mật khẩu: ")?,
    };

    let client = app::credentials_client(config)?;
    let credentials = fetch_credentials(&client, url).await?;
    AccessGate::new(config.store.open()).login(&credentials, username.trim(), password.trim())?;

    println!("Đăng nhập thành công.");
    Ok(())
}

pub fn run_logout(config: &GiaoanConfig) -> Result<()> {
    AccessGate::new(config.store.open()).logout()?;
    println!("Đã đăng xuất.");
    Ok(())
}

// -----------------------------------------------------------------------
// giaoan api-key
// -----------------------------------------------------------------------

pub fn run_api_key_command(command: ApiKeyCommands, config: &GiaoanConfig) -> Result<()> {
    let store = config.store.open();
    match command {
        ApiKeyCommands::Set { key } => {
            let key = match key {
                Some(key) => key,
                None => read_stdin_line("Gemini API key: ")?,
            };
            if !api_key::set_api_key(&store, &key)? {
                anyhow::bail!("API key is empty; nothing stored");
            }
            println!("API key saved in {}", store.dir().display());
        }
        ApiKeyCommands::Clear => {
            api_key::clear_api_key(&store)?;
            println!("Stored API key removed.");
        }
    }
    Ok(())
}
