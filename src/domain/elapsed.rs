use std::time::Duration;

/// Human-readable elapsed time, e.g. `1h 2m 3s 45ms`. Leading zero units are dropped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    if hours > 0 {
        format!("{}h {}m {}s {}ms", hours, mins, secs, ms)
    } else if total_mins > 0 {
        format!("{}m {}s {}ms", mins, secs, ms)
    } else {
        format!("{}s {}ms", secs, ms)
    }
}
