use crate::cli::DriverCommand;
use crate::commands::{print_json, CliError, Resources};

pub async fn run(
    command: DriverCommand,
    resources: &Resources,
) -> Result<(), CliError> {
    match command {
        DriverCommand::List => {
            print_json(&resources.list_drivers().await?)
        },
        DriverCommand::Profiles => {
            print_json(&resources.list_driver_profiles().await?)
        },
    }
}
