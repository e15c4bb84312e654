mod auth;
mod drivers;
mod locations;
mod maintenance;
mod missions;
mod notifications;
mod track;
mod vehicles;

use serde::Serialize;
use thiserror::Error;

use fleetlink::config::AppConfig;
use fleetlink::resource_api::{ResourceApiError, ResourceClient};
use fleetlink::session::{ProductionSessionManager, SessionError};

use crate::cli::Command;

pub type Resources = ResourceClient<ProductionSessionManager>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Resource(#[from] ResourceApiError),

    #[error("unreadable JSON argument: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("email and password must not be empty")]
    EmptyCredentials,

    #[error("not signed in; run `fleetctl login` first")]
    NotSignedIn,

    #[error("unknown notification kind \"{0}\"")]
    UnknownNotificationKind(String),
}

pub async fn dispatch(
    command: Command,
    config: &AppConfig,
    session: &ProductionSessionManager,
    resources: &Resources,
) -> Result<(), CliError> {
    match command {
        Command::Login(args) => auth::login(session, args).await,
        Command::Logout => auth::logout(session).await,
        Command::Whoami => auth::whoami(session),
        Command::Status => auth::status(session),
        Command::Vehicle(command) => vehicles::run(command, resources).await,
        Command::Mission(command) => missions::run(command, resources).await,
        Command::Driver(command) => drivers::run(command, resources).await,
        Command::Maintenance(command) =>
            maintenance::run(command, session, resources).await,
        Command::Notification(command) =>
            notifications::run(command, session, resources).await,
        Command::Location(command) => locations::run(command, resources).await,
        Command::Track(args) =>
            track::run(args, config, session, resources).await,
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
