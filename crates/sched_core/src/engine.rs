//! Tick-stepped single-CPU scheduling engine.
//!
//! Iteration `t` owns the slot `[t, t+1)`. Transitions seen at the start of
//! the slot are stamped `t`; transitions caused by consuming it are stamped
//! `t + 1`. Every slot from the first arrival on is charged to exactly one of
//! busy, overhead or idle.

use alloc::vec::Vec;

use log::{debug, info, trace, warn};
use sim_types::{OverheadKind, OverheadParams, SimError, Tick};

use crate::config::SimConfig;
use crate::event::{Event, EventKind, EventLog};
use crate::policy::Policy;
use crate::process::{LifecycleState, ProcessRecord};
use crate::scheduler::{RecordId, Scheduler};
use crate::stats::CpuCounters;
use crate::workload::Workload;

const CAP_FACTOR: u64 = 1000;

/// An overhead window being paid on behalf of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverheadWindow {
    pub kind: OverheadKind,
    pub owner: RecordId,
    pub remaining: Tick,
}

/// What the single CPU is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuSlot {
    Idle,
    Overhead(OverheadWindow),
    /// TIP/TCP window closed; the owner runs next slot unless preempted.
    Primed(RecordId),
    Running(RecordId),
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub config: SimConfig,
    pub events: EventLog,
    /// Final records, in workload order.
    pub records: Vec<ProcessRecord>,
    pub completion_order: Vec<RecordId>,
    pub counters: CpuCounters,
    pub first_arrival: Option<Tick>,
    /// Clock value when the loop stopped.
    pub end_tick: Tick,
    pub iterations: u64,
}

impl SimulationRun {
    /// Ticks between the first arrival and the end of the run.
    pub fn elapsed(&self) -> Tick {
        self.first_arrival
            .map_or(0, |first| self.end_tick.saturating_sub(first))
    }

    /// Looks up a final record by process name.
    pub fn record(&self, name: &str) -> Option<&ProcessRecord> {
        self.records.iter().find(|record| record.name() == name)
    }

    /// Returns true if every process terminated.
    pub fn all_terminated(&self) -> bool {
        self.records.iter().all(ProcessRecord::is_terminated)
    }
}

/// Result of `Engine::run`.
#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(SimulationRun),
    /// The safety cap stopped the loop; the run holds the partial log.
    CapReached(SimulationRun),
}

impl Outcome {
    /// Returns the run regardless of how it ended.
    pub fn run(&self) -> &SimulationRun {
        match self {
            Outcome::Completed(run) | Outcome::CapReached(run) => run,
        }
    }

    /// Consumes the outcome and returns the run.
    pub fn into_run(self) -> SimulationRun {
        match self {
            Outcome::Completed(run) | Outcome::CapReached(run) => run,
        }
    }

    /// Returns true if every process reached termination.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}

/// Default safety cap: generous multiple of the workload's total demand.
pub fn default_iteration_cap(workload: &Workload, overheads: &OverheadParams) -> u64 {
    let demand = workload.demand(overheads).saturating_add(1);
    workload
        .last_arrival()
        .saturating_add(CAP_FACTOR.saturating_mul(demand))
}

/// Single-CPU scheduling simulator.
#[derive(Debug)]
pub struct Engine {
    config: SimConfig,
    clock: Tick,
    records: Vec<ProcessRecord>,
    scheduler: Scheduler,
    blocked: Vec<RecordId>,
    completion_order: Vec<RecordId>,
    cpu: CpuSlot,
    counters: CpuCounters,
    log: EventLog,
    first_arrival: Option<Tick>,
    iteration_cap: u64,
}

impl Engine {
    /// Builds an engine; invalid parameters are rejected before any state exists.
    pub fn new(workload: Workload, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let policy = Policy::for_algorithm(config.algorithm, config.quantum)?;
        let iteration_cap = config
            .iteration_cap
            .unwrap_or_else(|| default_iteration_cap(&workload, &config.overheads));
        let scheduler = Scheduler::new(policy, config.io_return_rule());
        let records = workload
            .into_processes()
            .into_iter()
            .map(ProcessRecord::new)
            .collect();
        Ok(Self {
            config,
            clock: 0,
            records,
            scheduler,
            blocked: Vec::new(),
            completion_order: Vec::new(),
            cpu: CpuSlot::Idle,
            counters: CpuCounters::default(),
            log: EventLog::new(),
            first_arrival: None,
            iteration_cap,
        })
    }

    /// Runs the loop until every process terminated or the cap is hit.
    pub fn run(mut self) -> Outcome {
        info!(
            "starting {} run: {} processes, tip={} tcp={} tfp={}, cap {} iterations",
            self.config.algorithm.as_str(),
            self.records.len(),
            self.config.overheads.tip,
            self.config.overheads.tcp,
            self.config.overheads.tfp,
            self.iteration_cap
        );
        let mut iterations = 0u64;
        while self.has_pending_work() {
            if iterations >= self.iteration_cap {
                warn!(
                    "safety cap of {} iterations reached at tick {}, returning partial log",
                    self.iteration_cap, self.clock
                );
                return Outcome::CapReached(self.into_run(iterations));
            }
            self.step();
            iterations += 1;
        }
        info!(
            "run finished at tick {}: busy={} overhead={} idle={}",
            self.clock, self.counters.busy, self.counters.overhead, self.counters.idle
        );
        Outcome::Completed(self.into_run(iterations))
    }

    fn has_pending_work(&self) -> bool {
        self.cpu != CpuSlot::Idle
            || self.scheduler.ready_count() > 0
            || !self.blocked.is_empty()
            || self
                .records
                .iter()
                .any(|record| record.state == LifecycleState::New)
    }

    fn step(&mut self) {
        let now = self.clock;
        self.admit_arrivals(now);
        self.advance_io(now);
        self.accrue_ready_time();
        self.check_preemption(now);
        if self.cpu == CpuSlot::Idle {
            self.dispatch(now, true);
        }
        self.consume_slot(now);
        self.clock += 1;
    }

    fn admit_arrivals(&mut self, now: Tick) {
        for id in 0..self.records.len() {
            let record = &self.records[id];
            if record.state != LifecycleState::New || record.descriptor.arrival_time != now {
                continue;
            }
            self.first_arrival.get_or_insert(now);
            self.make_ready(id, now);
            self.emit(now, id, EventKind::Arrival);
        }
    }

    fn advance_io(&mut self, now: Tick) {
        let mut finished = Vec::new();
        for &id in &self.blocked {
            let record = &mut self.records[id];
            // A block that starts at `now` begins counting next slot.
            if record.block_start.map_or(false, |start| start < now) {
                record.remaining_io = record.remaining_io.saturating_sub(1);
                if record.remaining_io == 0 {
                    finished.push(id);
                }
            }
        }
        if finished.is_empty() {
            return;
        }
        self.blocked.retain(|id| !finished.contains(id));
        for id in finished {
            self.return_from_io(id, now);
        }
    }

    // Slots paying an overhead window earn no ready time, and neither does
    // the slot that resolves a TIP/TCP window.
    fn accrue_ready_time(&mut self) {
        if matches!(self.cpu, CpuSlot::Overhead(_) | CpuSlot::Primed(_)) {
            return;
        }
        for id in self.scheduler.ready_ids() {
            self.records[id].ticks_in_ready += 1;
        }
    }

    fn check_preemption(&mut self, now: Tick) {
        let holder = match self.cpu {
            CpuSlot::Running(id) | CpuSlot::Primed(id) => id,
            CpuSlot::Idle | CpuSlot::Overhead(_) => return,
        };
        if self.scheduler.should_preempt(&self.records[holder], &self.records) {
            self.preempt(holder, now);
        } else if self.cpu == CpuSlot::Primed(holder) {
            self.start_execution(holder, now);
        }
    }

    fn preempt(&mut self, id: RecordId, now: Tick) {
        let executed = self.cpu == CpuSlot::Running(id);
        self.cpu = CpuSlot::Idle;
        self.records[id].quantum_remaining = None;
        self.make_ready(id, now);
        if executed {
            self.emit(now, id, EventKind::EndExecution);
        }
        self.emit(now, id, EventKind::Preemption);
        debug!(
            "tick {}: {} preempted with {} ticks left in burst",
            now,
            self.records[id].name(),
            self.records[id].remaining_cpu
        );
        // The preferring record must be able to take over even if it just
        // came back from I/O.
        self.dispatch(now, false);
    }

    fn dispatch(&mut self, now: Tick, honor_io_return: bool) {
        let Some(id) = self
            .scheduler
            .select_next(&self.records, now, honor_io_return)
        else {
            return;
        };
        let kind = if self.records[id].first_dispatch {
            OverheadKind::Tip
        } else {
            OverheadKind::Tcp
        };
        let duration = self.config.overheads.duration(kind);
        self.scheduler.begin_slice(&mut self.records[id]);
        debug!(
            "tick {}: dispatching {} ({} of {} ticks)",
            now,
            self.records[id].name(),
            kind.as_str(),
            duration
        );
        if duration == 0 {
            if kind == OverheadKind::Tip {
                self.records[id].first_dispatch = false;
            }
            self.start_execution(id, now);
            return;
        }
        self.emit(now, id, EventKind::StartOverhead(kind));
        self.cpu = CpuSlot::Overhead(OverheadWindow {
            kind,
            owner: id,
            remaining: duration,
        });
    }

    fn consume_slot(&mut self, now: Tick) {
        trace!("tick {}: {:?}", now, self.cpu);
        match self.cpu {
            CpuSlot::Overhead(mut window) => {
                window.remaining -= 1;
                self.counters.overhead += 1;
                self.records[window.owner].overhead_ticks += 1;
                if window.remaining == 0 {
                    self.close_window(window, now + 1);
                } else {
                    self.cpu = CpuSlot::Overhead(window);
                }
            }
            CpuSlot::Running(id) => self.execute(id, now),
            CpuSlot::Primed(id) => {
                panic!("record {} still primed when its slot was consumed", id)
            }
            CpuSlot::Idle => {
                if self.first_arrival.is_some() {
                    self.counters.idle += 1;
                }
            }
        }
    }

    fn close_window(&mut self, window: OverheadWindow, at: Tick) {
        let id = window.owner;
        match window.kind {
            OverheadKind::Tip | OverheadKind::Tcp => {
                if window.kind == OverheadKind::Tip {
                    self.records[id].first_dispatch = false;
                }
                self.cpu = CpuSlot::Primed(id);
                self.emit(at, id, EventKind::EndOverhead(window.kind));
            }
            OverheadKind::Tfp => {
                self.cpu = CpuSlot::Idle;
                self.emit(at, id, EventKind::EndOverhead(OverheadKind::Tfp));
                self.terminate(id, at);
            }
        }
    }

    fn execute(&mut self, id: RecordId, now: Tick) {
        let record = &mut self.records[id];
        record.remaining_cpu -= 1;
        record.cpu_ticks += 1;
        if let Some(quantum) = record.quantum_remaining.as_mut() {
            *quantum = quantum.saturating_sub(1);
        }
        self.counters.busy += 1;
        if record.remaining_cpu > 0 {
            if self.scheduler.slice_expired(&self.records[id]) {
                self.expire_slice(id, now + 1);
            }
            return;
        }
        record.remaining_bursts -= 1;
        let last_burst = record.remaining_bursts == 0;
        self.cpu = CpuSlot::Idle;
        if last_burst {
            self.finish_last_burst(id, now + 1);
        } else {
            self.block(id, now + 1);
        }
    }

    // Requeued before the next slot admits its arrivals.
    fn expire_slice(&mut self, id: RecordId, at: Tick) {
        self.cpu = CpuSlot::Idle;
        self.records[id].quantum_remaining = None;
        self.make_ready(id, at);
        self.emit(at, id, EventKind::EndExecution);
        self.emit(at, id, EventKind::Preemption);
        debug!(
            "tick {}: {} used up its slice with {} ticks left in burst",
            at,
            self.records[id].name(),
            self.records[id].remaining_cpu
        );
    }

    fn finish_last_burst(&mut self, id: RecordId, at: Tick) {
        let tfp = self.config.overheads.tfp;
        let record = &mut self.records[id];
        record.quantum_remaining = None;
        record.state = LifecycleState::Terminating;
        self.emit(at, id, EventKind::EndExecution);
        if tfp == 0 {
            self.terminate(id, at);
            return;
        }
        self.emit(at, id, EventKind::StartOverhead(OverheadKind::Tfp));
        self.cpu = CpuSlot::Overhead(OverheadWindow {
            kind: OverheadKind::Tfp,
            owner: id,
            remaining: tfp,
        });
    }

    fn block(&mut self, id: RecordId, at: Tick) {
        let record = &mut self.records[id];
        let io = record.descriptor.io_burst_duration;
        record.state = LifecycleState::Blocked;
        record.quantum_remaining = None;
        record.remaining_cpu = record.descriptor.cpu_burst_duration;
        record.remaining_io = io;
        record.block_start = Some(at);
        self.emit(at, id, EventKind::EndExecution);
        self.emit(at, id, EventKind::Block);
        if io == 0 {
            self.return_from_io(id, at);
            return;
        }
        self.emit(at, id, EventKind::StartIo);
        self.blocked.push(id);
    }

    fn return_from_io(&mut self, id: RecordId, at: Tick) {
        let record = &mut self.records[id];
        record.block_start = None;
        record.io_returned_at = Some(at);
        self.make_ready(id, at);
        self.emit(at, id, EventKind::FinishIo);
    }

    fn terminate(&mut self, id: RecordId, at: Tick) {
        assert!(
            self.records[id].remaining_bursts == 0,
            "record {} terminating with {} bursts left",
            id,
            self.records[id].remaining_bursts
        );
        self.records[id].finalize(at);
        self.completion_order.push(id);
        self.emit(at, id, EventKind::Terminate);
        debug!("tick {}: {} terminated", at, self.records[id].name());
    }

    fn start_execution(&mut self, id: RecordId, now: Tick) {
        self.records[id].state = LifecycleState::Running;
        self.cpu = CpuSlot::Running(id);
        self.emit(now, id, EventKind::StartExecution);
    }

    fn make_ready(&mut self, id: RecordId, now: Tick) {
        let record = &mut self.records[id];
        record.state = LifecycleState::Ready;
        record.ready_since = now;
        self.scheduler.push_ready(id, &self.records);
    }

    fn emit(&mut self, tick: Tick, id: RecordId, kind: EventKind) {
        let record = &self.records[id];
        self.log.push(Event {
            tick,
            subject: record.descriptor.name.clone(),
            kind,
            state: record.state,
        });
    }

    fn into_run(self, iterations: u64) -> SimulationRun {
        SimulationRun {
            config: self.config,
            events: self.log,
            records: self.records,
            completion_order: self.completion_order,
            counters: self.counters,
            first_arrival: self.first_arrival,
            end_tick: self.clock,
            iterations,
        }
    }
}
