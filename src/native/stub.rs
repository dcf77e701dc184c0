//! In-process native engine used for deterministic testing and CLI tooling.
//!
//! The stub keeps every instance, player and log reader in a table, records
//! each mutating call in order, and simulates asynchronous playback with a
//! timer thread per run. All engine-raised events, including those for
//! caller-requested pause and stop, are delivered from one event thread
//! in the order they were raised, never from inside the call.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::mpsc;

use super::{
    LogMessage, NativeEngine, NativeEvent, NativeEventSink, RawInstance, RawLog, RawPlayer,
    SurfaceBinding,
};

const DEFAULT_MEDIA_LENGTH_MS: i64 = 10_000;
const DEFAULT_TICKS: u32 = 4;
const STUB_VIDEO_WIDTH: u32 = 640;
const STUB_VIDEO_HEIGHT: u32 = 360;

/// A mutating call received by the stub, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    Init { args: Vec<String> },
    Release(RawInstance),
    SetLogVerbosity { instance: RawInstance, level: i32 },
    SetUserAgent {
        instance: RawInstance,
        name: String,
        http_name: Option<String>,
    },
    AttachPlayer {
        instance: RawInstance,
        binding: SurfaceBinding,
    },
    ReleasePlayer(RawPlayer),
    AttachEvents(RawPlayer),
    DetachEvents(RawPlayer),
    PlayMedia { player: RawPlayer, mrl: String },
    Play(RawPlayer),
    Pause(RawPlayer),
    Stop(RawPlayer),
    SetTime { player: RawPlayer, time_ms: i64 },
    SetPosition { player: RawPlayer, position: f32 },
    LogOpen(RawInstance),
    LogClose(RawLog),
}

struct StubInstance {
    verbosity: i32,
}

struct StubPlayer {
    instance: RawInstance,
    media: Option<String>,
    playing: bool,
    /// Bumped per playback run; a timer thread stops once it is stale.
    run: u64,
    time_ms: i64,
    length_ms: i64,
}

struct StubLog {
    instance: RawInstance,
    messages: Vec<LogMessage>,
}

#[derive(Default)]
struct StubState {
    instances: HashMap<RawInstance, StubInstance>,
    players: HashMap<RawPlayer, StubPlayer>,
    sinks: HashMap<RawPlayer, Arc<dyn NativeEventSink>>,
    logs: HashMap<RawLog, StubLog>,
    calls: Vec<NativeCall>,
}

impl StubState {
    /// Append a message to every open log of `instance` that accepts `severity`.
    fn log(&mut self, instance: RawInstance, severity: i32, module: &str, message: String) {
        let threshold = match self.instances.get(&instance) {
            Some(inst) => inst.verbosity,
            None => return,
        };
        if severity < threshold {
            return;
        }
        for log in self.logs.values_mut().filter(|l| l.instance == instance) {
            log.messages.push(LogMessage {
                severity,
                module: module.to_string(),
                message: message.clone(),
            });
        }
    }
}

/// Pending-event counter shared by the queue and the event thread.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn add(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Producer side of the engine's single event thread.
///
/// Every engine-raised event goes through one FIFO, so events for a
/// player reach its sink in the order they were posted.
#[derive(Clone)]
struct EventQueue {
    tx: mpsc::UnboundedSender<(RawPlayer, NativeEvent)>,
    pending: Arc<Pending>,
}

impl EventQueue {
    fn start(state: Arc<Mutex<StubState>>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<(RawPlayer, NativeEvent)>();
        let pending = Arc::new(Pending::default());
        let done = Arc::clone(&pending);

        std::thread::spawn(move || {
            while let Some((player, event)) = rx.blocking_recv() {
                let delivered = catch_unwind(AssertUnwindSafe(|| {
                    StubEngine::deliver(&state, player, event);
                }));
                if delivered.is_err() {
                    log::warn!("[StubEngine] Event sink panicked on {:?}", event);
                }
                done.done();
            }
        });

        Self { tx, pending }
    }

    fn post(&self, player: RawPlayer, event: NativeEvent) {
        self.pending.add();
        if self.tx.send((player, event)).is_err() {
            self.pending.done();
        }
    }
}

/// Deterministic stand-in for the native engine.
pub struct StubEngine {
    state: Arc<Mutex<StubState>>,
    events: EventQueue,
    workers: Mutex<Vec<JoinHandle<()>>>,
    next_id: AtomicU64,
    rejected_args: Vec<String>,
    refuse_players: bool,
    refuse_logs: bool,
    media_length_ms: i64,
    ticks: u32,
    tick_interval: Duration,
}

impl StubEngine {
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(StubState::default()));
        Self {
            events: EventQueue::start(Arc::clone(&state)),
            state,
            workers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            rejected_args: Vec::new(),
            refuse_players: false,
            refuse_logs: false,
            media_length_ms: DEFAULT_MEDIA_LENGTH_MS,
            ticks: DEFAULT_TICKS,
            tick_interval: Duration::ZERO,
        }
    }

    /// `init` returns no instance when `arg` is among the arguments.
    pub fn with_rejected_argument(mut self, arg: impl Into<String>) -> Self {
        self.rejected_args.push(arg.into());
        self
    }

    /// `attach_player` always returns no player.
    pub fn refusing_players(mut self) -> Self {
        self.refuse_players = true;
        self
    }

    /// `log_open` always returns no log reader.
    pub fn refusing_logs(mut self) -> Self {
        self.refuse_logs = true;
        self
    }

    /// Shape of the simulated playback run started by `play`.
    pub fn with_playback(
        mut self,
        media_length_ms: i64,
        ticks: u32,
        tick_interval: Duration,
    ) -> Self {
        self.media_length_ms = media_length_ms;
        self.ticks = ticks.max(1);
        self.tick_interval = tick_interval;
        self
    }

    /// Every mutating call received so far.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.lock_state().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&NativeCall) -> bool) -> usize {
        self.lock_state().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn live_instances(&self) -> usize {
        self.lock_state().instances.len()
    }

    pub fn live_players(&self) -> usize {
        self.lock_state().players.len()
    }

    pub fn has_sink(&self, player: RawPlayer) -> bool {
        self.lock_state().sinks.contains_key(&player)
    }

    /// Deliver `event` to the sink of `player` on the calling thread,
    /// bypassing the event thread.
    ///
    /// Returns false when no sink is attached.
    pub fn emit(&self, player: RawPlayer, event: NativeEvent) -> bool {
        Self::deliver(&self.state, player, event)
    }

    /// Queue `events` for delivery, in order, on the engine event thread.
    pub fn emit_async(&self, player: RawPlayer, events: Vec<NativeEvent>) {
        for event in events {
            self.events.post(player, event);
        }
    }

    /// Block until every playback run has ended and every queued event
    /// has been handled. Must not be called from an event sink.
    pub fn wait_idle(&self) {
        loop {
            let drained: Vec<JoinHandle<()>> = {
                let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
                workers.drain(..).collect()
            };
            for worker in drained {
                if worker.join().is_err() {
                    log::warn!("[StubEngine] Playback thread panicked");
                }
            }
            self.events.pending.wait_idle();

            // Handlers may have started new runs.
            let idle = self
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_empty();
            if idle {
                return;
            }
        }
    }

    fn deliver(state: &Mutex<StubState>, player: RawPlayer, event: NativeEvent) -> bool {
        // Clone the sink out so a listener may call back into the engine.
        let sink = {
            let guard = state.lock().unwrap_or_else(PoisonError::into_inner);
            guard.sinks.get(&player).cloned()
        };
        match sink {
            Some(sink) => {
                sink.on_native_event(event);
                true
            }
            None => false,
        }
    }

    fn push_worker(&self, worker: JoinHandle<()>) {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        workers.retain(|w| !w.is_finished());
        workers.push(worker);
    }

    fn lock_state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Post the opening events of a run, then tick on a timer thread.
    ///
    /// Called with the state lock held, so the opening events are queued
    /// before any pause or stop the caller issues afterwards.
    fn start_playback(&self, player: RawPlayer, run: u64) {
        let events = self.events.clone();
        events.post(player, NativeEvent::Playing);
        events.post(
            player,
            NativeEvent::VideoOutput {
                width: STUB_VIDEO_WIDTH,
                height: STUB_VIDEO_HEIGHT,
            },
        );
        events.post(player, NativeEvent::LengthChanged(self.media_length_ms));

        let state = Arc::clone(&self.state);
        let length = self.media_length_ms;
        let ticks = self.ticks;
        let interval = self.tick_interval;

        let worker = std::thread::spawn(move || {
            for tick in 1..=ticks {
                if !interval.is_zero() {
                    std::thread::sleep(interval);
                }
                // Check and post under the state lock so a concurrent
                // pause or stop is ordered strictly before or after.
                let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
                let current = guard.players.get_mut(&player);
                let Some(p) = current.filter(|p| p.playing && p.run == run) else {
                    return;
                };
                let time_ms = length * i64::from(tick) / i64::from(ticks);
                p.time_ms = time_ms;
                events.post(player, NativeEvent::TimeChanged(time_ms));
                events.post(
                    player,
                    NativeEvent::PositionChanged(tick as f32 / ticks as f32),
                );
                if tick == ticks {
                    p.playing = false;
                    events.post(player, NativeEvent::EndReached);
                }
            }
        });
        self.push_worker(worker);
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeEngine for StubEngine {
    fn init(&self, args: &[String]) -> Option<RawInstance> {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::Init {
            args: args.to_vec(),
        });
        if args.iter().any(|a| self.rejected_args.contains(a)) {
            return None;
        }
        let instance = RawInstance(self.next_id());
        state
            .instances
            .insert(instance, StubInstance { verbosity: 0 });
        Some(instance)
    }

    fn release(&self, instance: RawInstance) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::Release(instance));
        state.instances.remove(&instance);
    }

    fn set_log_verbosity(&self, instance: RawInstance, level: i32) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::SetLogVerbosity { instance, level });
        if let Some(inst) = state.instances.get_mut(&instance) {
            inst.verbosity = level;
        }
    }

    fn log_verbosity(&self, instance: RawInstance) -> i32 {
        self.lock_state()
            .instances
            .get(&instance)
            .map(|i| i.verbosity)
            .unwrap_or(0)
    }

    fn set_user_agent(&self, instance: RawInstance, name: &str, http_name: Option<&str>) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::SetUserAgent {
            instance,
            name: name.to_string(),
            http_name: http_name.map(str::to_string),
        });
        state.log(instance, 1, "core", format!("user agent set to {:?}", name));
    }

    fn attach_player(&self, instance: RawInstance, binding: SurfaceBinding) -> Option<RawPlayer> {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::AttachPlayer { instance, binding });
        if self.refuse_players || !state.instances.contains_key(&instance) {
            state.log(instance, 4, "player", format!("cannot create {:?} player", binding));
            return None;
        }
        let player = RawPlayer(self.next_id());
        state.players.insert(
            player,
            StubPlayer {
                instance,
                media: None,
                playing: false,
                run: 0,
                time_ms: 0,
                length_ms: 0,
            },
        );
        state.log(instance, 0, "player", format!("created {:?} player", binding));
        Some(player)
    }

    fn release_player(&self, player: RawPlayer) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::ReleasePlayer(player));
        state.sinks.remove(&player);
        state.players.remove(&player);
    }

    fn attach_events(&self, player: RawPlayer, sink: Arc<dyn NativeEventSink>) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::AttachEvents(player));
        state.sinks.insert(player, sink);
    }

    fn detach_events(&self, player: RawPlayer) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::DetachEvents(player));
        state.sinks.remove(&player);
    }

    fn play_media(&self, player: RawPlayer, mrl: &str) -> bool {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::PlayMedia {
            player,
            mrl: mrl.to_string(),
        });
        let Some(p) = state.players.get_mut(&player) else {
            return false;
        };
        p.media = Some(mrl.to_string());
        p.time_ms = 0;
        p.playing = true;
        p.length_ms = self.media_length_ms;
        p.run += 1;
        let (instance, run) = (p.instance, p.run);
        state.log(instance, 1, "input", format!("opening {}", mrl));
        self.start_playback(player, run);
        true
    }

    fn play(&self, player: RawPlayer) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::Play(player));
        if let Some(p) = state.players.get_mut(&player) {
            if p.media.is_some() && !p.playing {
                p.playing = true;
                p.length_ms = self.media_length_ms;
                p.run += 1;
                self.start_playback(player, p.run);
            }
        }
    }

    fn pause(&self, player: RawPlayer) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::Pause(player));
        if let Some(p) = state.players.get_mut(&player) {
            p.playing = false;
            self.events.post(player, NativeEvent::Paused);
        }
    }

    fn stop(&self, player: RawPlayer) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::Stop(player));
        if let Some(p) = state.players.get_mut(&player) {
            p.playing = false;
            p.time_ms = 0;
            self.events.post(player, NativeEvent::Stopped);
        }
    }

    fn set_time(&self, player: RawPlayer, time_ms: i64) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::SetTime { player, time_ms });
        if let Some(p) = state.players.get_mut(&player) {
            p.time_ms = time_ms.clamp(0, p.length_ms.max(0));
        }
    }

    fn time(&self, player: RawPlayer) -> i64 {
        self.lock_state()
            .players
            .get(&player)
            .map(|p| p.time_ms)
            .unwrap_or(-1)
    }

    fn length(&self, player: RawPlayer) -> i64 {
        self.lock_state()
            .players
            .get(&player)
            .map(|p| p.length_ms)
            .unwrap_or(-1)
    }

    fn set_position(&self, player: RawPlayer, position: f32) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::SetPosition { player, position });
        if let Some(p) = state.players.get_mut(&player) {
            let clamped = position.clamp(0.0, 1.0);
            p.time_ms = (p.length_ms as f64 * f64::from(clamped)) as i64;
        }
    }

    fn position(&self, player: RawPlayer) -> f32 {
        self.lock_state()
            .players
            .get(&player)
            .map(|p| {
                if p.length_ms > 0 {
                    p.time_ms as f32 / p.length_ms as f32
                } else {
                    0.0
                }
            })
            .unwrap_or(-1.0)
    }

    fn is_playing(&self, player: RawPlayer) -> bool {
        self.lock_state()
            .players
            .get(&player)
            .map(|p| p.playing)
            .unwrap_or(false)
    }

    fn log_open(&self, instance: RawInstance) -> Option<RawLog> {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::LogOpen(instance));
        if self.refuse_logs || !state.instances.contains_key(&instance) {
            return None;
        }
        let log = RawLog(self.next_id());
        state.logs.insert(
            log,
            StubLog {
                instance,
                messages: Vec::new(),
            },
        );
        Some(log)
    }

    fn log_close(&self, log: RawLog) {
        let mut state = self.lock_state();
        state.calls.push(NativeCall::LogClose(log));
        state.logs.remove(&log);
    }

    fn log_messages(&self, log: RawLog) -> Vec<LogMessage> {
        self.lock_state()
            .logs
            .get(&log)
            .map(|l| l.messages.clone())
            .unwrap_or_default()
    }

    fn log_count(&self, log: RawLog) -> usize {
        self.lock_state()
            .logs
            .get(&log)
            .map(|l| l.messages.len())
            .unwrap_or(0)
    }

    fn log_clear(&self, log: RawLog) {
        if let Some(l) = self.lock_state().logs.get_mut(&log) {
            l.messages.clear();
        }
    }
}
