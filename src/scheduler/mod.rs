//! Mode-aware update scheduler
//!
//! The scheduler owns every time group and the single piece of state
//! shared across them: the active mode index. It has two phases. While
//! configuring, modes are registered and metric instances are slotted
//! into their interval groups. `start()` transitions to running exactly
//! once, spawning one background task per group; from then on only the
//! active mode mutates.

pub mod time_group;

pub use time_group::TimeGroup;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::interval;

use crate::error::ExporterError;
use crate::exporter::mode_set::{ModeIndex, ModeSet, DEFAULT_MODE};

/// Name reported (and accepted) for mode index 0
pub const DEFAULT_MODE_NAME: &str = "default";

/// Owns the time groups and the active mode indicator
pub struct Scheduler {
    /// Groups accumulated during configuration; drained into their
    /// background tasks by `start()`
    groups: Mutex<Vec<TimeGroup>>,

    /// Registered mode names; index `i` holds the name of mode `i + 1`.
    /// Immutable once running.
    mode_names: RwLock<Vec<String>>,

    /// The one value read by every tick and written by mode switches
    active_mode: AtomicUsize,

    /// Number of distinct intervals seen; stable across `start()`
    group_count: AtomicUsize,

    started: AtomicBool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create a scheduler in the configuring phase with the default
    /// mode active
    pub fn new() -> Self {
        Self {
            groups: Mutex::new(Vec::new()),
            mode_names: RwLock::new(Vec::new()),
            active_mode: AtomicUsize::new(DEFAULT_MODE),
            group_count: AtomicUsize::new(0),
            started: AtomicBool::new(false),
        }
    }

    /// Register a named mode, assigning the next sequential index.
    ///
    /// `"default"` is reserved for index 0 and cannot be registered.
    /// Only valid while configuring.
    pub fn register_mode(&self, name: &str) -> Result<ModeIndex, ExporterError> {
        if self.started.load(Ordering::SeqCst) {
            return Err(ExporterError::AlreadyStarted);
        }
        if name == DEFAULT_MODE_NAME {
            return Err(ExporterError::DuplicateMode(name.to_string()));
        }

        let mut names = self.mode_names.write().expect("mode table lock poisoned");
        if names.iter().any(|existing| existing == name) {
            return Err(ExporterError::DuplicateMode(name.to_string()));
        }
        names.push(name.to_string());
        Ok(names.len())
    }

    /// Look up the index of a registered mode name
    pub fn mode_index(&self, name: &str) -> Option<ModeIndex> {
        let names = self.mode_names.read().expect("mode table lock poisoned");
        names.iter().position(|existing| existing == name).map(|i| i + 1)
    }

    /// Registered mode names in declaration order, excluding the default
    pub fn mode_names(&self) -> Vec<String> {
        self.mode_names
            .read()
            .expect("mode table lock poisoned")
            .clone()
    }

    /// The active mode as `(name, is_default)`
    pub fn active_mode(&self) -> (String, bool) {
        let index = self.active_mode_index();
        if index == DEFAULT_MODE {
            return (DEFAULT_MODE_NAME.to_string(), true);
        }

        let names = self.mode_names.read().expect("mode table lock poisoned");
        let name = names
            .get(index - 1)
            .unwrap_or_else(|| panic!("active mode index {index} has no registered name"));
        (name.clone(), false)
    }

    /// The raw active mode index, as read by tick loops
    pub fn active_mode_index(&self) -> ModeIndex {
        self.active_mode.load(Ordering::SeqCst)
    }

    /// Atomically switch the active mode.
    ///
    /// Ticks that begin after this returns observe the new mode; ticks
    /// already in flight finish with the old one. A failed switch
    /// leaves the active mode untouched.
    pub fn set_active_mode(&self, name: &str) -> Result<(), ExporterError> {
        let index = if name == DEFAULT_MODE_NAME {
            DEFAULT_MODE
        } else {
            self.mode_index(name)
                .ok_or_else(|| ExporterError::UnknownMode(name.to_string()))?
        };

        self.active_mode.store(index, Ordering::SeqCst);
        tracing::info!(mode = name, index, "active mode switched");
        Ok(())
    }

    /// Slot a metric instance into the group matching `interval`,
    /// creating the group on first use. Grouping is by exact interval
    /// equality. Only valid while configuring.
    pub fn add_to_group(&self, interval: Duration, set: ModeSet) -> Result<(), ExporterError> {
        if self.started.load(Ordering::SeqCst) {
            return Err(ExporterError::AlreadyStarted);
        }

        let mut groups = self.groups.lock().expect("groups lock poisoned");
        match groups.iter_mut().find(|group| group.interval() == interval) {
            Some(group) => group.add_member(set),
            None => {
                let mut group = TimeGroup::new(interval);
                group.add_member(set);
                groups.push(group);
                self.group_count.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    /// Number of distinct time groups
    pub fn group_count(&self) -> usize {
        self.group_count.load(Ordering::SeqCst)
    }

    /// Number of registered modes, excluding the default
    pub fn mode_count(&self) -> usize {
        self.mode_names
            .read()
            .expect("mode table lock poisoned")
            .len()
    }

    /// Transition to the running phase: spawn one periodic task per
    /// time group.
    ///
    /// Each task fires an immediate first tick, then ticks every group
    /// interval; phases are not aligned across groups. The transition
    /// happens at most once; repeated calls are ignored with a warning.
    /// There is no stop: the loops run until process exit.
    pub fn start(self: Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("scheduler already started; ignoring repeated start()");
            return;
        }

        let groups = std::mem::take(&mut *self.groups.lock().expect("groups lock poisoned"));
        tracing::info!(groups = groups.len(), "starting update scheduler");

        for group in groups {
            let scheduler = Arc::clone(&self);
            tokio::spawn(async move {
                let mut rng = StdRng::from_entropy();
                let mut ticker = interval(group.interval());
                loop {
                    ticker.tick().await;
                    let mode = scheduler.active_mode_index();
                    tracing::trace!(
                        interval_secs = group.interval().as_secs(),
                        mode,
                        members = group.len(),
                        "time group tick"
                    );
                    group.tick(mode, &mut rng);
                }
            });
        }
    }
}
