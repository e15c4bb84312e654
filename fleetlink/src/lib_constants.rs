use time::Duration;

// how early the proactive refresh fires before access token expiry;
// must stay below the shortest ttl the backend hands out or every
// renewal degenerates into an immediate one
pub const RENEWAL_MARGIN: Duration = Duration::minutes(5);

pub const DEFAULT_BASE_URL: &str = "http://localhost:8055";

pub const APP_CONFIG_ENV_PREFIX: &str = "FLEETLINK_";

// fallbacks when the platform directories cannot be resolved
pub const STATE_DIRECTORY_FALLBACK: &str = "/var/lib/fleetlink";
pub const CONFIG_DIRECTORY_FALLBACK: &str = "/etc/fleetlink";

// relative to the state directory; the three keys are written together
// and cleared together
pub const ACCESS_TOKEN_FILE: &str = "access_token";
pub const REFRESH_TOKEN_FILE: &str = "refresh_token";
pub const TOKEN_EXPIRES_FILE: &str = "token_expires";

pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 10;
