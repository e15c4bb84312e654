use serde_json::Value;

use crate::cli::MissionCommand;
use crate::commands::{print_json, CliError, Resources};

pub async fn run(
    command: MissionCommand,
    resources: &Resources,
) -> Result<(), CliError> {
    match command {
        MissionCommand::List => {
            print_json(&resources.list_missions().await?)
        },
        MissionCommand::Create { data } => {
            let body: Value = serde_json::from_str(&data)?;
            print_json(&resources.create_mission(&body).await?)
        },
        MissionCommand::Update { id, data } => {
            let patch: Value = serde_json::from_str(&data)?;
            print_json(&resources.update_mission(id, &patch).await?)
        },
    }
}
