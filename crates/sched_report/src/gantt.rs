use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use sched_core::{EventKind, OverheadKind, SimulationRun, Tick};

use crate::table::name_width;

/// Default number of ticks per rendered segment.
pub const SEGMENT_TICKS: usize = 30;

/// What a process was doing during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GanttCell {
    Absent,
    Waiting,
    Cpu,
    Overhead(OverheadKind),
    Io,
}

impl GanttCell {
    /// Returns the character drawn for this cell.
    pub fn symbol(self) -> char {
        match self {
            GanttCell::Absent => ' ',
            GanttCell::Waiting => '.',
            GanttCell::Cpu => '#',
            GanttCell::Overhead(OverheadKind::Tip) => 'i',
            GanttCell::Overhead(OverheadKind::Tcp) => 'c',
            GanttCell::Overhead(OverheadKind::Tfp) => 'f',
            GanttCell::Io => '~',
        }
    }
}

/// One process lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttRow {
    pub name: String,
    pub cells: Vec<GanttCell>,
}

/// Per-tick activity of every process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttChart {
    pub rows: Vec<GanttRow>,
    pub ticks: usize,
}

/// Replays the event log of a run into one lane per process.
pub fn build_gantt(run: &SimulationRun) -> GanttChart {
    let ticks = run.end_tick as usize;
    let rows = run
        .records
        .iter()
        .map(|record| {
            let mut cells = vec![GanttCell::Absent; ticks];
            let mut mode = GanttCell::Absent;
            let mut since: Tick = 0;
            for event in run.events.for_subject(record.name()) {
                fill(&mut cells, since, event.tick, mode);
                since = event.tick;
                mode = mode_after(event.kind);
            }
            fill(&mut cells, since, run.end_tick, mode);
            GanttRow {
                name: record.name().into(),
                cells,
            }
        })
        .collect();
    GanttChart { rows, ticks }
}

fn mode_after(kind: EventKind) -> GanttCell {
    match kind {
        EventKind::Arrival
        | EventKind::EndOverhead(OverheadKind::Tip)
        | EventKind::EndOverhead(OverheadKind::Tcp)
        | EventKind::EndExecution
        | EventKind::FinishIo
        | EventKind::Preemption => GanttCell::Waiting,
        EventKind::StartOverhead(kind) => GanttCell::Overhead(kind),
        EventKind::StartExecution => GanttCell::Cpu,
        EventKind::Block | EventKind::StartIo => GanttCell::Io,
        EventKind::EndOverhead(OverheadKind::Tfp) | EventKind::Terminate => GanttCell::Absent,
    }
}

fn fill(cells: &mut [GanttCell], from: Tick, to: Tick, mode: GanttCell) {
    let end = (to as usize).min(cells.len());
    let start = (from as usize).min(end);
    for cell in &mut cells[start..end] {
        *cell = mode;
    }
}

/// Renders the chart in segments of `segment` ticks with a legend.
pub fn format_gantt(chart: &GanttChart, segment: usize) -> String {
    let segment = segment.max(1);
    let width = name_width(chart.rows.iter().map(|row| row.name.as_str()));
    let mut out = String::new();
    out.push_str("gantt:\n");
    let mut start = 0;
    while start < chart.ticks {
        let end = (start + segment).min(chart.ticks);
        let _ = writeln!(out, "  ticks {}..{}", start, end);
        let _ = write!(out, "  {:<width$} |", "");
        for tick in start..end {
            out.push(char::from(b'0' + (tick % 10) as u8));
        }
        out.push_str("|\n");
        for row in &chart.rows {
            let _ = write!(out, "  {:<width$} |", row.name);
            // Lanes shorter than the chart are padded with blanks.
            for tick in start..end {
                let cell = row.cells.get(tick).copied().unwrap_or(GanttCell::Absent);
                out.push(cell.symbol());
            }
            out.push_str("|\n");
        }
        start = end;
    }
    out.push_str("  legend: # cpu  . ready  ~ i/o  i TIP  c TCP  f TFP\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::{simulate, Algorithm, OverheadParams, ProcessDescriptor, SimConfig};

    fn lane(chart: &GanttChart, name: &str) -> String {
        chart
            .rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.cells.iter().map(|cell| cell.symbol()).collect())
            .expect("lane should exist")
    }

    #[test]
    fn gantt_lanes_follow_the_event_log() {
        let (outcome, _) = simulate(
            vec![
                ProcessDescriptor::new("P1", 0, 1, 3, 0, 0),
                ProcessDescriptor::new("P2", 1, 1, 2, 0, 0),
            ],
            SimConfig::new(Algorithm::Fcfs).with_overheads(OverheadParams::new(1, 1, 1)),
        )
        .expect("simulation should succeed");
        let chart = build_gantt(outcome.run());

        assert_eq!(chart.ticks, 9);
        assert_eq!(lane(&chart, "P1"), "i###f    ");
        assert_eq!(lane(&chart, "P2"), " ....i##f");
    }

    #[test]
    fn gantt_shows_io_lanes() {
        let (outcome, _) = simulate(
            vec![ProcessDescriptor::new("A", 0, 2, 1, 2, 0)],
            SimConfig::new(Algorithm::Fcfs),
        )
        .expect("simulation should succeed");
        let chart = build_gantt(outcome.run());
        assert_eq!(lane(&chart, "A"), "#~~#");
    }

    #[test]
    fn format_splits_long_runs_into_segments() {
        let chart = GanttChart {
            rows: vec![GanttRow {
                name: "A".into(),
                cells: vec![GanttCell::Cpu; 12],
            }],
            ticks: 12,
        };
        let text = format_gantt(&chart, 5);
        assert!(text.contains("ticks 0..5"));
        assert!(text.contains("ticks 10..12"));
        assert!(text.contains("|##|"));
        assert!(text.contains("legend"));
    }

    #[test]
    fn format_pads_lanes_shorter_than_the_chart() {
        let chart = GanttChart {
            rows: vec![
                GanttRow {
                    name: "A".into(),
                    cells: vec![GanttCell::Cpu; 2],
                },
                GanttRow {
                    name: "B".into(),
                    cells: Vec::new(),
                },
            ],
            ticks: 6,
        };
        let text = format_gantt(&chart, 4);
        assert!(text.contains("|##  |"));
        assert!(text.contains("|    |"));
        assert!(text.contains("ticks 4..6"));
        assert!(text.contains("|  |"));
    }
}
