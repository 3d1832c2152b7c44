//! Log lines that are reused or long enough to clutter call sites.

pub const STARTUP: &str = "Starting intake bot...";
pub const POLL_LOOP_START: &str = "Starting long-poll loop...";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn startup_channels(primary: &str, secondary: &str) -> String {
    format!("Channel 1: {primary}, Channel 2: {secondary}")
}

pub fn startup_admin(admin_id: i64, registered: bool) -> String {
    if registered {
        format!("Admin ID: {admin_id}")
    } else {
        format!("Admin ID: {admin_id} (has not started the bot yet)")
    }
}

pub fn startup_applications(count: i64) -> String {
    format!("Applications in database: {count}")
}

pub fn poll_failed(err: &str) -> String {
    format!("getUpdates failed: {err}")
}

pub fn route_failed(user_id: i64, err: &str) -> String {
    format!("Failed to handle update from {user_id}: {err}")
}

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}
