//! Auth command - ChatGPT subscription login management.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use clawlog_oauth::{
    FileTokenStore, LoginFlow, ManualBrowser, OAuthConfig, TokenStore, TokenRecord,
};
use console::{Style, style};
use serde::Serialize;

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in with your ChatGPT account in the browser
    Login {
        /// Log in again even if a valid token is stored
        #[arg(long)]
        force: bool,
    },

    /// Show authentication status
    Status,

    /// Remove stored OAuth tokens
    Logout,

    /// Print a usable access token, refreshing it if needed
    Token,
}

/// Status output for JSON mode.
#[derive(Debug, Serialize)]
struct StatusOutput {
    authenticated: bool,
    token_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<clawlog_oauth::TokenInfo>,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { force } => cmd_login(force, ctx).await,
        AuthCommand::Status => cmd_status(ctx).await,
        AuthCommand::Logout => cmd_logout(ctx).await,
        AuthCommand::Token => cmd_token(ctx).await,
    }
}

fn oauth_config(ctx: &Context) -> OAuthConfig {
    OAuthConfig::default().with_http_timeout(ctx.config.http.timeout())
}

fn token_store(ctx: &Context) -> Arc<FileTokenStore> {
    Arc::new(FileTokenStore::with_path(ctx.paths.token_file()))
}

fn login_flow(ctx: &Context, store: Arc<FileTokenStore>) -> Result<LoginFlow> {
    let flow = LoginFlow::new(oauth_config(ctx), store)
        .map_err(|e| anyhow::anyhow!("Failed to set up login: {}", e))?;
    Ok(if ctx.config.auth.open_browser {
        flow
    } else {
        flow.with_browser(Arc::new(ManualBrowser))
    })
}

async fn cmd_login(force: bool, ctx: &Context) -> Result<()> {
    let store = token_store(ctx);

    // Check if already authenticated
    if !force
        && let Some(record) = store.load().await
        && !record.needs_refresh()
    {
        let info = record.info();
        println!(
            "Already authenticated (expires in {})",
            info.expires_in_display()
        );
        println!("Run 'claw-log auth login --force' to log in again.");
        return Ok(());
    }

    let open_browser = ctx.config.auth.open_browser;
    let flow = login_flow(ctx, store)?.on_authorize_url(move |url| {
        println!();
        if open_browser {
            println!("Opening the ChatGPT login page in your browser...");
            println!("If it does not open, visit this URL:");
        } else {
            println!("Open this URL in a browser on this machine:");
        }
        println!();
        println!("  {}", url);
        println!();
        println!("Waiting for the login to complete (up to 2 minutes)...");
    });

    println!("{}", style("ChatGPT OAuth Login").bold());
    println!("===================");
    println!("A ChatGPT Plus or Pro subscription is required.");

    let record = flow
        .login()
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {}", e))?;

    let info = record.info();
    println!();
    println!("{}", Style::new().green().apply_to("Authentication successful!"));
    if let Some(email) = &info.email {
        println!("Account: {}", email);
    }
    println!("Token expires in: {}", info.expires_in_display());
    if ctx.verbose {
        println!("Saved to: {}", ctx.paths.token_file().display());
    }

    Ok(())
}

async fn cmd_status(ctx: &Context) -> Result<()> {
    let store = token_store(ctx);
    let record = store.load().await;

    if ctx.json_output {
        let output = StatusOutput {
            authenticated: record.is_some(),
            token_file: store.token_path().display().to_string(),
            token: record.as_ref().map(TokenRecord::info),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style("Authentication Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));

    match record {
        Some(record) => {
            let info = record.info();
            println!("OAuth: authenticated");
            if let Some(email) = &info.email {
                println!("  Account: {}", email);
            }
            println!("  Expires: {}", info.expires_in_display());
            if !info.scope.is_empty() {
                println!("  Scope: {}", info.scope);
            }
            if let Some(saved) = info.saved_at_display() {
                println!("  Saved: {}", saved);
            }
            if !info.has_refresh_token {
                println!("  {}", dim.apply_to("No refresh token; log in again after expiry"));
            }
        }
        None if store.exists() => {
            println!("OAuth: token file exists but could not be read");
            println!("  Run 'claw-log auth login' to log in again");
        }
        None => {
            println!("OAuth: not authenticated");
            println!("  Run 'claw-log auth login' to log in with ChatGPT");
        }
    }

    if ctx.verbose {
        println!("  Token file: {}", store.token_path().display());
    }

    Ok(())
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let store = token_store(ctx);

    if store.exists() {
        store
            .delete()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete tokens: {}", e))?;
        println!("OAuth tokens removed.");
    } else {
        println!("No OAuth tokens found.");
    }

    Ok(())
}

async fn cmd_token(ctx: &Context) -> Result<()> {
    let store = token_store(ctx);
    let record = store.load().await.ok_or_else(|| {
        anyhow::anyhow!("No OAuth tokens found. Run 'claw-log auth login' first.")
    })?;

    let refresher = login_flow(ctx, store)?.refresher();
    let record = refresher.ensure_fresh(record).await;
    if record.needs_refresh() {
        eprintln!("Warning: token is expired; run 'claw-log auth login' if requests fail");
    }

    println!("{}", record.access_token);
    Ok(())
}
