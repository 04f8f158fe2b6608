use alloc::string::{String, ToString};
use core::fmt::Write;

use sched_core::{EventLog, ProcessMetrics, Statistics};

const NAME_WIDTH: usize = 10;

/// Formats the event log as a tick-ordered table.
pub fn format_event_log(log: &EventLog) -> String {
    let width = name_width(log.iter().map(|event| event.subject.as_str()));
    let mut out = String::new();
    out.push_str("events:\n");
    let _ = writeln!(out, "  {:>6}  {:<width$}  {:<18}  state", "tick", "process", "event");
    for event in log {
        let _ = writeln!(
            out,
            "  {:>6}  {:<width$}  {:<18}  {}",
            event.tick,
            event.subject,
            event.kind.to_string(),
            event.state.as_str()
        );
    }
    out
}

/// Formats per-process metrics, one row per process.
pub fn format_process_table(stats: &Statistics) -> String {
    let width = name_width(stats.processes.iter().map(|metrics| metrics.name.as_str()));
    let mut out = String::new();
    out.push_str("processes:\n");
    let _ = writeln!(
        out,
        "  {:<width$}  {:>7}  {:>6}  {:>6}  {:>9}  {:>5}  {:>4}  {:>8}",
        "process", "arrival", "end", "return", "norm", "ready", "cpu", "overhead"
    );
    for metrics in &stats.processes {
        push_process_row(&mut out, metrics, width);
    }
    out
}

fn push_process_row(out: &mut String, metrics: &ProcessMetrics, width: usize) {
    let completion = optional(metrics.completion.map(|tick| tick.to_string()));
    let return_time = optional(metrics.return_time.map(|tick| tick.to_string()));
    let normalized = optional(
        metrics
            .normalized_return_time
            .map(|value| alloc::format!("{:.2}", value)),
    );
    let _ = writeln!(
        out,
        "  {:<width$}  {:>7}  {:>6}  {:>6}  {:>9}  {:>5}  {:>4}  {:>8}",
        metrics.name,
        metrics.arrival,
        completion,
        return_time,
        normalized,
        metrics.ticks_in_ready,
        metrics.cpu_ticks,
        metrics.overhead_ticks
    );
}

/// Formats the CPU usage breakdown and the batch metrics.
pub fn format_cpu_usage(stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str("cpu:\n");
    push_share(&mut out, "busy", stats.cpu.busy, stats.cpu.busy_percent);
    push_share(&mut out, "overhead", stats.cpu.overhead, stats.cpu.overhead_percent);
    push_share(&mut out, "idle", stats.cpu.idle, stats.cpu.idle_percent);
    let _ = writeln!(out, "  {:<9} {:>6}", "total:", stats.cpu.total);

    out.push_str("batch:\n");
    let _ = writeln!(out, "  completed: {}", stats.batch.completed);
    out.push_str("  return time: ");
    out.push_str(&optional(stats.batch.batch_return_time.map(|tick| tick.to_string())));
    out.push('\n');
    out.push_str("  mean return time: ");
    out.push_str(&optional(
        stats.batch.mean_return_time.map(|value| alloc::format!("{:.2}", value)),
    ));
    out.push('\n');
    out.push_str("  mean normalized return time: ");
    out.push_str(&optional(
        stats
            .batch
            .mean_normalized_return_time
            .map(|value| alloc::format!("{:.2}", value)),
    ));
    out.push('\n');
    out
}

fn push_share(out: &mut String, label: &str, ticks: u64, percent: f64) {
    let _ = writeln!(out, "  {:<9} {:>6}  {:>6.2}%", alloc::format!("{}:", label), ticks, percent);
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

pub(crate) fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        .max(NAME_WIDTH)
}
