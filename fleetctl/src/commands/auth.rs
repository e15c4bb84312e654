use std::io;
use std::io::Write;

use fleetlink::session::ProductionSessionManager;
use fleetlink::util::StrExt;

use crate::cli::LoginArgs;
use crate::commands::{print_json, CliError};

pub async fn login(
    session: &ProductionSessionManager,
    args: LoginArgs,
) -> Result<(), CliError> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password()?,
    };
    let email = args
        .email
        .nonblank_to_some()
        .ok_or(CliError::EmptyCredentials)?;
    if password.is_empty() {
        return Err(CliError::EmptyCredentials);
    }
    session.sign_in(&email, &password).await?;
    if let Some(identity) = session.identity() {
        println!(
            "signed in as {} ({})",
            identity.display_name(),
            identity.role_name.as_deref().unwrap_or("no role"),
        );
    }
    Ok(())
}

pub async fn logout(
    session: &ProductionSessionManager,
) -> Result<(), CliError> {
    session.sign_out().await;
    println!("signed out");
    Ok(())
}

pub fn whoami(session: &ProductionSessionManager) -> Result<(), CliError> {
    match session.identity() {
        Some(identity) => print_json(&identity),
        None => Err(CliError::NotSignedIn),
    }
}

pub fn status(session: &ProductionSessionManager) -> Result<(), CliError> {
    let Some(identity) = session.identity() else {
        println!("not signed in");
        return Ok(());
    };
    println!(
        "signed in as {} ({})",
        identity.display_name(),
        identity.role_name.as_deref().unwrap_or("no role"),
    );
    if let Some(role) = identity.role() {
        if role.is_admin_class() {
            println!("console: dispatch");
        }
        if role.is_driver_class() {
            println!("console: driver");
        }
    }
    Ok(())
}

fn prompt_password() -> io::Result<String> {
    eprint!("password: ");
    io::stderr().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
