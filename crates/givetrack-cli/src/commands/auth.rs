use anyhow::Result;
use tracing::warn;

use crate::app::{prompt, App};

/// Environment variable read instead of prompting for the password
const PASSWORD_ENV: &str = "GIVETRACK_PASSWORD";

pub async fn login(app: &mut App, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt("Username", app.config.last_username.as_deref())?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    println!("Authenticating...");
    let user = app.api.login(&username, &password).await?;

    app.config.last_username = Some(user.username.clone());
    if let Err(e) = app.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {} ({})", user.username, user.role);
    Ok(())
}

pub async fn logout(app: &mut App) -> Result<()> {
    let was_logged_in = app.api.session().is_authenticated().await;
    app.api.logout().await;
    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

/// Asks the server for the profile so a stale session shows up here
pub async fn whoami(app: &mut App) -> Result<()> {
    if !app.api.session().is_authenticated().await {
        println!("Not logged in.");
        return Ok(());
    }

    let user = app.api.current_user().await?;
    println!("Username: {}", user.username);
    if !user.email.is_empty() {
        println!("Email:    {}", user.email);
    }
    println!("Role:     {}", user.role);
    if user.role.can_manage_events() {
        println!("May create, edit and delete events.");
    }
    Ok(())
}
