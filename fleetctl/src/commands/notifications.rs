use serde_json::Value;

use fleetlink::model::NotificationKind;
use fleetlink::session::ProductionSessionManager;

use crate::cli::NotificationCommand;
use crate::commands::{print_json, CliError, Resources};

pub async fn run(
    command: NotificationCommand,
    session: &ProductionSessionManager,
    resources: &Resources,
) -> Result<(), CliError> {
    match command {
        NotificationCommand::List { recipient_id } => {
            let recipient_id = match recipient_id {
                Some(recipient_id) => Some(recipient_id),
                None => Some(
                    session
                        .identity()
                        .map(|identity| identity.id)
                        .ok_or(CliError::NotSignedIn)?,
                ),
            };
            print_json(&resources.list_notifications(recipient_id).await?)
        },
        NotificationCommand::Send { recipient_id, kind, message } => {
            let kind = parse_kind(&kind)?;
            let sender_id = session.identity().map(|identity| identity.id);
            print_json(
                &resources
                    .send_notification(sender_id, recipient_id, kind, &message)
                    .await?,
            )
        },
        NotificationCommand::MarkRead { id } => {
            print_json(&resources.mark_notification_read(id).await?)
        },
    }
}

fn parse_kind(raw: &str) -> Result<NotificationKind, CliError> {
    serde_json::from_value(Value::String(raw.to_string()))
        .map_err(|_| CliError::UnknownNotificationKind(raw.to_string()))
}
