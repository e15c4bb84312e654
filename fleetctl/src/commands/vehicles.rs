use serde_json::Value;

use crate::cli::VehicleCommand;
use crate::commands::{print_json, CliError, Resources};

pub async fn run(
    command: VehicleCommand,
    resources: &Resources,
) -> Result<(), CliError> {
    match command {
        VehicleCommand::List => {
            print_json(&resources.list_vehicles().await?)
        },
        VehicleCommand::Create { data } => {
            let body: Value = serde_json::from_str(&data)?;
            print_json(&resources.create_vehicle(&body).await?)
        },
        VehicleCommand::Update { id, data } => {
            let patch: Value = serde_json::from_str(&data)?;
            print_json(&resources.update_vehicle(id, &patch).await?)
        },
        VehicleCommand::Delete { id } => {
            resources.delete_vehicle(id).await?;
            println!("deleted {id}");
            Ok(())
        },
    }
}
