use crate::cli::LocationCommand;
use crate::commands::{print_json, CliError, Resources};

pub async fn run(
    command: LocationCommand,
    resources: &Resources,
) -> Result<(), CliError> {
    match command {
        LocationCommand::Recent { limit } => {
            print_json(&resources.recent_locations(limit).await?)
        },
    }
}
