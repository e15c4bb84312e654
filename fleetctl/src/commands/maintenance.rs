use fleetlink::session::ProductionSessionManager;

use crate::cli::MaintenanceCommand;
use crate::commands::{print_json, CliError, Resources};

pub async fn run(
    command: MaintenanceCommand,
    session: &ProductionSessionManager,
    resources: &Resources,
) -> Result<(), CliError> {
    match command {
        MaintenanceCommand::List { vehicle_id } => {
            print_json(&resources.list_maintenance_logs(vehicle_id).await?)
        },
        MaintenanceCommand::Report { vehicle_id, issue } => {
            let reported_by =
                session.identity().map(|identity| identity.id);
            print_json(
                &resources
                    .report_maintenance(vehicle_id, &issue, reported_by)
                    .await?,
            )
        },
    }
}
