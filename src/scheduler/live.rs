use super::cooldown::CooldownTracker;
use super::task_list::{SchedulePlan, SchedulingState, Task, TaskListBuilder};
use super::SkillSlot;
use crate::catalog::SkillCatalog;
use crate::config::MacroSettings;
use crate::consts::SLEEP_COEFFICIENT_UNIT;
use crate::error::{MacroError, MacroResult};
use crate::preset::{LinkUseType, PresetConfiguration};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Monotonic millisecond clock the live loop runs on.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&self, ms: u64);
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

/// Output side of the macro. Each `press` is one complete press/release pair.
pub trait KeySink: Send + Sync {
    fn press(&self, key: &str);
    fn click(&self);
}

/// Shared "macro active" flag; cancelling stops the loop between key events.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Requests sent to the running loop from other threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualTrigger {
    /// Hotkey of the link skill at this index in `PresetConfiguration::link_skills`.
    Link(usize),
}

/// Copy of a running loop's state, published after every iteration.
#[derive(Debug, Clone)]
struct LiveSnapshot {
    state: SchedulingState,
    resume_at_ms: u64,
}

/// Live scheduler. The tick loop in [`MacroScheduler::run_live`] is the only
/// owner of the scheduling state; manual triggers reach it over a channel and
/// previews read the snapshot it publishes.
pub struct MacroScheduler {
    builder: TaskListBuilder,
    tracker: CooldownTracker,
    keys: Vec<String>,
    casting: Vec<bool>,
    manual_links: Vec<Option<Vec<SkillSlot>>>,
    delay_ms: u64,
    unit_ms: u64,
    trigger_tx: Sender<ManualTrigger>,
    trigger_rx: Mutex<Receiver<ManualTrigger>>,
    live: Mutex<Option<LiveSnapshot>>,
}

impl MacroScheduler {
    pub fn new(
        preset: &PresetConfiguration,
        catalog: &SkillCatalog,
        settings: &MacroSettings,
    ) -> MacroResult<Self> {
        let delay_ms = settings.check_delay(preset.effective_delay_ms(settings))?;
        let reduction =
            settings.check_cooldown_reduction(preset.effective_cooldown_reduction(settings))?;
        let tracker = CooldownTracker::from_preset(preset, catalog, reduction)?;

        let mut casting = Vec::with_capacity(preset.equipped.len());
        for slot in 0..preset.equipped.len() {
            casting.push(match preset.skill_at(slot) {
                Some(id) => catalog.get(id)?.is_casting,
                None => false,
            });
        }

        let keys: Vec<String> = (0..preset.equipped.len())
            .map(|slot| preset.skill_keys.get(slot).cloned().unwrap_or_default())
            .collect();
        if let Some(slot) = preset
            .equipped_slots()
            .into_iter()
            .find(|&s| keys[s].is_empty())
        {
            return Err(MacroError::Validation(format!(
                "slot {} has no key bound",
                slot
            )));
        }

        let manual_links = preset
            .link_skills
            .iter()
            .map(|l| (l.use_type == LinkUseType::Manual).then(|| l.member_slots.clone()))
            .collect();

        let (trigger_tx, trigger_rx) = mpsc::channel();
        Ok(Self {
            builder: TaskListBuilder::new(SchedulePlan::from_preset(preset)),
            tracker,
            keys,
            casting,
            manual_links,
            delay_ms,
            unit_ms: settings.unit_time_ms.max(1),
            trigger_tx,
            trigger_rx: Mutex::new(trigger_rx),
            live: Mutex::new(None),
        })
    }

    /// Fresh per-run state: every equipped slot starts off cooldown.
    pub fn fresh_state(&self) -> SchedulingState {
        SchedulingState::new(self.tracker.clone())
    }

    pub fn builder(&self) -> &TaskListBuilder {
        &self.builder
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn manual_trigger_handle(&self) -> Sender<ManualTrigger> {
        self.trigger_tx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.live.lock().map(|live| live.is_some()).unwrap_or(false)
    }

    /// The next `k` slots to be dispatched. While a run is active this
    /// continues from a clone of its latest state, otherwise from a fresh
    /// run. Either way it works on a virtual clock and never touches the loop.
    pub fn preview_next(&self, k: usize) -> Vec<SkillSlot> {
        let mut out = Vec::with_capacity(k);
        if k == 0 {
            return out;
        }
        let snapshot = match self.live.lock() {
            Ok(live) => live.clone(),
            Err(_) => None,
        };
        let (mut state, start_ms) = match snapshot {
            Some(snap) => (snap.state, snap.resume_at_ms),
            None => (self.fresh_state(), 0),
        };
        self.builder.drive_virtual(
            &mut state,
            start_ms,
            u64::MAX,
            self.delay_ms,
            self.unit_ms,
            |task, _| {
                out.push(task.slot);
                out.len() < k
            },
        );
        out
    }

    /// Blocking tick loop. Returns when `cancel` fires; a key press already
    /// started always completes first.
    pub fn run_live(
        &self,
        cancel: &CancelToken,
        sink: &dyn KeySink,
        clock: &dyn Clock,
    ) -> MacroResult<()> {
        let triggers = self
            .trigger_rx
            .lock()
            .map_err(|_| MacroError::Runtime("trigger channel poisoned".into()))?;
        // Stale hotkeys from before this run are dropped.
        while triggers.try_recv().is_ok() {}

        let mut state = self.fresh_state();
        let mut selected: Option<SkillSlot> = None;
        let idle_ms = (self.unit_ms as f64 * SLEEP_COEFFICIENT_UNIT) as u64;
        let mut dispatched = 0usize;

        info!("▶️  Macro started ({} ms delay)", self.delay_ms);
        while !cancel.is_cancelled() {
            while let Ok(trigger) = triggers.try_recv() {
                self.enqueue_manual(&mut state, trigger);
            }

            let now = clock.now_ms();
            self.builder.tick(&mut state, now);

            match state.dispatch_next(now) {
                Some(task) => {
                    self.publish(&state, now + self.delay_ms);
                    self.send_keys(task, sink, clock, &mut selected);
                    dispatched += 1;
                    clock.sleep_ms(self.delay_ms);
                }
                None => {
                    self.publish(&state, now + idle_ms);
                    clock.sleep_ms(idle_ms);
                }
            }
        }
        if let Ok(mut live) = self.live.lock() {
            *live = None;
        }
        info!("⏹️  Macro stopped after {} dispatches", dispatched);
        Ok(())
    }

    fn publish(&self, state: &SchedulingState, resume_at_ms: u64) {
        if let Ok(mut live) = self.live.lock() {
            *live = Some(LiveSnapshot {
                state: state.clone(),
                resume_at_ms,
            });
        }
    }

    fn enqueue_manual(&self, state: &mut SchedulingState, trigger: ManualTrigger) {
        let ManualTrigger::Link(idx) = trigger;
        let Some(Some(members)) = self.manual_links.get(idx) else {
            warn!("⚠️  Ignoring trigger for unknown manual link skill #{}", idx);
            return;
        };
        if members.iter().any(|&s| self.tracker.cooldown_ms(s).is_none()) {
            warn!("⚠️  Link skill #{} references an empty slot; ignored", idx);
            return;
        }
        // The combo replaces any pending single use of its members.
        state.queue.retain(|t| !members.contains(&t.slot));
        for (offset, &slot) in members.iter().enumerate() {
            state.ready.remove(&slot);
            state.queue.insert(
                offset,
                Task {
                    slot,
                    combo: None,
                },
            );
        }
        debug!(link = idx, "manual link skill queued");
    }

    /// A casting skill needs press, delay, click; when the in-game selection
    /// already sits on the slot only the confirming input is sent.
    fn send_keys(
        &self,
        task: Task,
        sink: &dyn KeySink,
        clock: &dyn Clock,
        selected: &mut Option<SkillSlot>,
    ) {
        let key = &self.keys[task.slot];
        let casting = self.casting[task.slot];
        if *selected != Some(task.slot) {
            sink.press(key);
            if casting {
                clock.sleep_ms(self.delay_ms);
                sink.click();
            }
            *selected = Some(task.slot);
        } else if casting {
            sink.click();
        } else {
            sink.press(key);
        }
        debug!(slot = task.slot, key = %key, "dispatched");
    }
}
