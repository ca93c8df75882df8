// crates/toolmark-server/src/ledger/aggregate.rs
// Per-tool lifetime statistics derived from each invocation

use toolmark_types::{InvocationRecord, ToolStats};

/// Fold one invocation into the existing stats for its tool.
///
/// The first invocation of a tool seeds a fresh record. Stats are cumulative
/// and independent of whatever is later trimmed from the raw invocation list.
pub fn apply(existing: Option<&ToolStats>, record: &InvocationRecord) -> ToolStats {
    let (successes, errors) = if record.success { (1, 0) } else { (0, 1) };

    let mut stats = match existing {
        Some(prev) => prev.clone(),
        None => ToolStats {
            call_count: 0,
            total_duration_ms: 0,
            avg_duration_ms: 0,
            success_count: 0,
            error_count: 0,
            last_used: String::new(),
        },
    };

    stats.call_count += 1;
    stats.total_duration_ms = stats.total_duration_ms.saturating_add(record.duration_ms);
    stats.avg_duration_ms = rounded_average(stats.total_duration_ms, stats.call_count);
    stats.success_count += successes;
    stats.error_count += errors;
    stats.last_used = record.timestamp.clone();
    stats
}

/// `round(total / count)`, halves rounding up
fn rounded_average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    total.saturating_add(count / 2) / count
}
