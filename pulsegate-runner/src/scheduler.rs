//! Two-cadence scheduler.
//!
//! One worker thread drives the engine: a short tick refreshes feed data
//! and re-emits indicator snapshots per tracked pair, a longer tick runs
//! the generation + validation sweep. The thread talks to its host over
//! explicit channels — commands in, a bounded event stream out. Rejected
//! candidates are logged and reported as events, but no signal payload
//! ever leaves the scheduler unless the pipeline passed it.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use log::{debug, info, warn};

use pulsegate_core::domain::{FinalSignal, Horizon};
use pulsegate_core::gates::Decision;

use crate::engine::{Engine, MarketDataUpdate};

/// Commands from the host into the scheduler.
#[derive(Debug)]
pub enum EngineCommand {
    EnableLive,
    DisableLive,
    EmergencyStop(bool),
    /// Push-style vendor update for one instrument.
    LiveUpdate { symbol: String },
    Shutdown,
}

/// Events out of the scheduler, topic-keyed by symbol at the transport
/// layer. Rejections carry reasons for the audit log only.
#[derive(Debug)]
pub enum EngineEvent {
    MarketData(Box<MarketDataUpdate>),
    Signal(Box<FinalSignal>),
    Rejected {
        symbol: String,
        horizon: Horizon,
        reasons: Vec<String>,
    },
}

/// Bounded event queue: a stalled consumer drops market-data updates
/// rather than ballooning memory. Signals are never dropped silently.
const EVENT_QUEUE_DEPTH: usize = 256;

pub struct SchedulerHandle {
    commands: mpsc::Sender<EngineCommand>,
    pub events: Receiver<EngineEvent>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn send(&self, command: EngineCommand) {
        let _ = self.commands.send(command);
    }

    /// Stop the worker and wait for it to drain.
    pub fn shutdown(self) {
        let _ = self.commands.send(EngineCommand::Shutdown);
        let _ = self.join.join();
    }
}

/// Spawn the scheduler on its own thread.
///
/// `clock` supplies the exchange-local time each tick observes; tests
/// inject a fixed or stepped clock, production passes local now.
pub fn spawn<C>(engine: Engine, clock: C) -> SchedulerHandle
where
    C: Fn() -> NaiveDateTime + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel::<EngineCommand>();
    let (event_tx, event_rx) = mpsc::sync_channel::<EngineEvent>(EVENT_QUEUE_DEPTH);

    let join = thread::spawn(move || run_loop(engine, clock, command_rx, event_tx));

    SchedulerHandle {
        commands: command_tx,
        events: event_rx,
        join,
    }
}

fn run_loop<C>(
    engine: Engine,
    clock: C,
    commands: Receiver<EngineCommand>,
    events: SyncSender<EngineEvent>,
) where
    C: Fn() -> NaiveDateTime,
{
    let fast_period = Duration::from_secs(engine.config().fast_tick_secs);
    let slow_period = Duration::from_secs(engine.config().slow_tick_secs);
    let pairs = engine.tracked_pairs();

    // First fast tick fires immediately; the first sweep waits a full
    // slow period so indicators have settled data behind them.
    let mut next_fast = Instant::now();
    let mut next_slow = Instant::now() + slow_period;

    info!(
        "scheduler running: fast {}s, slow {}s, {} pairs",
        fast_period.as_secs(),
        slow_period.as_secs(),
        pairs.len()
    );

    loop {
        // Drain pending commands first so a shutdown or emergency stop
        // takes effect before the next tick's work.
        loop {
            match commands.try_recv() {
                Ok(EngineCommand::Shutdown) => {
                    info!("scheduler shutting down");
                    return;
                }
                Ok(EngineCommand::EnableLive) => {
                    let mode = engine.enable_live();
                    info!("live mode requested; feed now {mode:?}");
                }
                Ok(EngineCommand::DisableLive) => {
                    engine.disable_live();
                    info!("feed switched to synthetic");
                }
                Ok(EngineCommand::EmergencyStop(stopped)) => {
                    engine.set_emergency_stop(stopped);
                    warn!("emergency stop set to {stopped}");
                }
                Ok(EngineCommand::LiveUpdate { symbol }) => {
                    if let Err(err) = engine.apply_live_update(&symbol, clock()) {
                        warn!("live update for unknown instrument: {err}");
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    info!("command channel closed; scheduler exiting");
                    return;
                }
            }
        }

        let now_instant = Instant::now();

        if now_instant >= next_fast {
            fast_tick(&engine, &pairs, clock(), &events);
            next_fast = now_instant + fast_period;
        }

        if now_instant >= next_slow {
            slow_tick(&engine, clock(), &events);
            next_slow = now_instant + slow_period;
        }

        let sleep_until = next_fast.min(next_slow);
        let pause = sleep_until
            .saturating_duration_since(Instant::now())
            .min(Duration::from_millis(100));
        thread::sleep(pause);
    }
}

fn fast_tick(
    engine: &Engine,
    pairs: &[(String, Horizon)],
    now: NaiveDateTime,
    events: &SyncSender<EngineEvent>,
) {
    for (symbol, horizon) in pairs {
        match engine.market_tick(symbol, *horizon, now) {
            Ok(update) => {
                // Market data is droppable under backpressure.
                if let Err(TrySendError::Full(_)) =
                    events.try_send(EngineEvent::MarketData(Box::new(update)))
                {
                    debug!("event queue full; dropped market data for {symbol}/{horizon}");
                }
            }
            Err(err) => warn!("market tick {symbol}/{horizon}: {err}"),
        }
    }
}

fn slow_tick(engine: &Engine, now: NaiveDateTime, events: &SyncSender<EngineEvent>) {
    for outcome in engine.signal_sweep(now) {
        match outcome.result.decision {
            Decision::Rejected => {
                let reasons: Vec<String> = outcome
                    .result
                    .reasons()
                    .iter()
                    .map(|r| r.to_string())
                    .collect();
                debug!(
                    "{}/{} candidate rejected: {}",
                    outcome.symbol,
                    outcome.horizon,
                    reasons.join("; ")
                );
                let _ = events.try_send(EngineEvent::Rejected {
                    symbol: outcome.symbol,
                    horizon: outcome.horizon,
                    reasons,
                });
            }
            Decision::Passed | Decision::Rewritten => {
                if let Some(signal) = outcome.result.final_signal {
                    info!(
                        "{}/{} signal {} accepted ({:?}, score {:.0})",
                        outcome.symbol,
                        outcome.horizon,
                        signal.candidate.id,
                        outcome.result.decision,
                        outcome.result.gate_score
                    );
                    // Signals block rather than drop: the subscriber side
                    // owns the queue depth.
                    let _ = events.send(EngineEvent::Signal(Box::new(signal)));
                }
            }
        }
    }
}
