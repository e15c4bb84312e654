use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(version, author, about)]
pub struct CliConfig {
    /// Configuration file; defaults to the per-user config directory.
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and persist the session.
    Login(LoginArgs),
    /// Sign out and clear the persisted session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Show the session and which console the role grants.
    Status,
    /// Vehicle records.
    #[command(subcommand)]
    Vehicle(VehicleCommand),
    /// Mission records.
    #[command(subcommand)]
    Mission(MissionCommand),
    /// Drivers and their profiles.
    #[command(subcommand)]
    Driver(DriverCommand),
    /// Maintenance logs.
    #[command(subcommand)]
    Maintenance(MaintenanceCommand),
    /// Notifications.
    #[command(subcommand)]
    Notification(NotificationCommand),
    /// Location samples.
    #[command(subcommand)]
    Location(LocationCommand),
    /// Report device positions until the input runs dry or ctrl-c.
    Track(TrackArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Prompted for on standard input when omitted.
    #[arg(long, env = "FLEETCTL_PASSWORD")]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum VehicleCommand {
    List,
    /// Create from a JSON object.
    Create {
        #[arg(long)]
        data: String,
    },
    /// Apply a JSON patch to one vehicle.
    Update {
        id: Uuid,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum MissionCommand {
    List,
    /// Create from a JSON object.
    Create {
        #[arg(long)]
        data: String,
    },
    /// Apply a JSON patch to one mission.
    Update {
        id: Uuid,
        #[arg(long)]
        data: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DriverCommand {
    /// Users holding the driver role.
    List,
    /// Driver profiles with licensing and availability.
    Profiles,
}

#[derive(Debug, Subcommand)]
pub enum MaintenanceCommand {
    List {
        #[arg(long)]
        vehicle_id: Option<Uuid>,
    },
    /// File a new issue against a vehicle.
    Report {
        #[arg(long)]
        vehicle_id: Uuid,
        #[arg(long)]
        issue: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// Inbox of the given recipient; the signed-in user when omitted.
    List {
        #[arg(long)]
        recipient_id: Option<Uuid>,
    },
    /// Send as the signed-in user. Kind is one of Alert, Broadcast, SOS,
    /// Instruction.
    Send {
        #[arg(long)]
        recipient_id: Option<Uuid>,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        message: String,
    },
    MarkRead {
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum LocationCommand {
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },
}

#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Vehicle the samples are attributed to.
    #[arg(long)]
    pub vehicle_id: Option<Uuid>,

    /// Seconds between samples; the configuration default when omitted.
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Newline-delimited JSON fixes; standard input when omitted.
    #[arg(long)]
    pub fixes: Option<PathBuf>,
}
