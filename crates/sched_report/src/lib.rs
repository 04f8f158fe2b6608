#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod gantt;
pub mod table;

use alloc::string::{String, ToString};

use sched_core::{Outcome, Statistics};

pub use gantt::{build_gantt, format_gantt, GanttCell, GanttChart, GanttRow, SEGMENT_TICKS};
pub use table::{format_cpu_usage, format_event_log, format_process_table};

/// Optional sections of a text report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub events: bool,
    pub gantt: bool,
}

/// Formats the run parameters into a CLI-friendly header block.
pub fn format_header(outcome: &Outcome) -> String {
    let run = outcome.run();
    let mut out = String::new();
    out.push_str("simulation:\n");
    out.push_str("  algorithm: ");
    out.push_str(run.config.algorithm.as_str());
    if run.config.algorithm.is_preemptive() {
        out.push_str(" (preemptive)");
    }
    out.push('\n');
    out.push_str("  overheads: tip=");
    out.push_str(&run.config.overheads.tip.to_string());
    out.push_str(" tcp=");
    out.push_str(&run.config.overheads.tcp.to_string());
    out.push_str(" tfp=");
    out.push_str(&run.config.overheads.tfp.to_string());
    out.push('\n');
    if let Some(quantum) = run.config.quantum {
        out.push_str("  quantum: ");
        out.push_str(&quantum.to_string());
        out.push('\n');
    }
    out.push_str("  io return: ");
    out.push_str(run.config.io_return_rule().as_str());
    out.push('\n');
    out.push_str("  outcome: ");
    if outcome.is_completed() {
        out.push_str("completed");
    } else {
        out.push_str("safety cap reached after ");
        out.push_str(&run.iterations.to_string());
        out.push_str(" iterations");
    }
    out.push('\n');
    out.push_str("  end tick: ");
    out.push_str(&run.end_tick.to_string());
    out.push('\n');
    out
}

/// Formats a full report: header, optional sections, metrics and CPU usage.
pub fn format_report(outcome: &Outcome, stats: &Statistics, options: ReportOptions) -> String {
    let run = outcome.run();
    let mut out = format_header(outcome);
    if options.events {
        out.push_str(&format_event_log(&run.events));
    }
    if options.gantt {
        out.push_str(&format_gantt(&build_gantt(run), SEGMENT_TICKS));
    }
    out.push_str(&format_process_table(stats));
    out.push_str(&format_cpu_usage(stats));
    out
}
