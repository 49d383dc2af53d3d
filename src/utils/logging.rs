use serde::Serialize;
use tracing::debug;

/// Logs `value` as pretty JSON at DEBUG; serialization is skipped when DEBUG is off.
pub(crate) fn debug_json<T: Serialize>(what: &str, value: &T) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    debug!(body = %pretty, "{what}");
}
