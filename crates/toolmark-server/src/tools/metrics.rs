// crates/toolmark-server/src/tools/metrics.rs
// Tool usage summary from the invocation ledger

use super::ToolContext;
use super::requests::MetricsRequest;
use crate::persist::file_size_bytes;
use crate::utils::truncate;

pub async fn metrics_summary<C: ToolContext>(ctx: &C, req: MetricsRequest) -> Result<String, String> {
    let Some(invocations) = ctx.telemetry().invocations() else {
        return Ok("Metrics are disabled.".to_string());
    };

    let summary = invocations.summary();
    if summary.is_empty() {
        return Ok("No tool calls recorded yet.".to_string());
    }

    let mut output = format!(
        "Tool usage ({} calls in total)\n\n",
        invocations.total_invocations()
    );
    output.push_str(&format!(
        "{:<28} {:>7} {:>7} {:>7} {:>9}  {}\n",
        "TOOL", "CALLS", "OK", "ERR", "AVG MS", "LAST USED"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for (name, stats) in &summary {
        output.push_str(&format!(
            "{:<28} {:>7} {:>7} {:>7} {:>9}  {}\n",
            truncate(name, 25),
            stats.call_count,
            stats.success_count,
            stats.error_count,
            stats.avg_duration_ms,
            stats.last_used
        ));
    }

    let ledger = invocations.ledger();
    output.push_str(&format!(
        "\nLedger: {} ({} bytes on disk, {} raw records kept)\n",
        ledger.path().display(),
        file_size_bytes(ledger.path()).await,
        ledger.read(|doc| doc.invocations.len()).unwrap_or(0)
    ));

    let recent = req.recent.unwrap_or(0);
    if recent > 0 {
        output.push_str("\nRecent calls:\n");
        for record in invocations.recent(recent) {
            let status = if record.success { "ok" } else { "error" };
            output.push_str(&format!(
                "- {} {} {}ms {}",
                record.timestamp, record.tool_name, record.duration_ms, status
            ));
            if let Some(ref err) = record.error {
                output.push_str(&format!(": {}", truncate(err, 80)));
            }
            output.push('\n');
        }
    }

    Ok(output)
}
