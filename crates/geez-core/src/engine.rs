//! Game store - the single owner of progression state.
//!
//! The store wraps one [`ProgressionState`] behind a mutex. Every dispatch
//! applies one event fully, then writes the snapshot if the persisted
//! subset changed. Saving is best effort: failures are logged and counted,
//! and the in-memory state stays authoritative.
//!
//! The state lock is never held across I/O. A changed snapshot is parked in
//! a single pending slot while the state lock is still held, so the slot
//! always carries the newest state. Whichever dispatch finds the backend
//! idle drains the slot; a dispatch that finds it busy returns at once and
//! leaves its snapshot to the thread already writing.

use crate::config::EngineConfig;
use crate::persistence::{load_snapshot, save_snapshot, KeyValueStore, MemoryStore};
use geez_logic::progression::{Event, ProgressionState, Snapshot, Transition};
use geez_logic::settings::Settings;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

struct Saver {
    store: Box<dyn KeyValueStore>,
    save_failures: u64,
}

/// Shared progression store used by every screen and game session.
pub struct GameStore {
    state: Mutex<ProgressionState>,
    pending: Mutex<Option<Snapshot>>,
    saver: Mutex<Saver>,
    config: EngineConfig,
}

impl GameStore {
    /// Open a store, hydrating from any snapshot already saved under
    /// `config.storage_key`.
    pub fn new(store: Box<dyn KeyValueStore>, config: EngineConfig) -> Self {
        let saved = load_snapshot(&*store, &config.storage_key);
        let game = Self {
            state: Mutex::new(ProgressionState::default()),
            pending: Mutex::new(None),
            saver: Mutex::new(Saver {
                store,
                save_failures: 0,
            }),
            config,
        };
        match saved {
            Some(snapshot) => {
                log::info!(
                    "restored progress: {} xp, {} families unlocked",
                    snapshot.xp,
                    snapshot.unlocked_ids.len()
                );
                game.dispatch(Event::Hydrate(snapshot));
            }
            None => log::info!("no saved progress, starting fresh"),
        }
        game
    }

    /// In-memory store with default config.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A copy of the current state.
    pub fn get_state(&self) -> ProgressionState {
        self.state().clone()
    }

    /// A copy of the learner's settings only.
    pub fn settings(&self) -> Settings {
        self.state().settings.clone()
    }

    /// Apply one event and persist if needed.
    pub fn dispatch(&self, event: Event) -> Transition {
        let transition = {
            let mut state = self.state();
            let transition = state.apply(&event, &self.config.progression);
            log::debug!(
                "{} -> xp {} streak {} (+{} xp)",
                event.name(),
                state.xp,
                state.streak,
                transition.xp_gained
            );
            if transition.leveled_up {
                log::info!("reached level {}", state.level());
            }
            if transition.persisted_changed {
                *self.pending() = Some(state.snapshot());
            }
            transition
        };
        if transition.persisted_changed {
            self.flush();
        }
        transition
    }

    /// Write pending snapshots unless another thread is already writing.
    fn flush(&self) {
        loop {
            let mut saver = match self.saver.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(e)) => e.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };
            loop {
                // Slot lock is released before the write.
                let next = self.pending().take();
                let Some(snapshot) = next else {
                    break;
                };
                let key = self.config.storage_key.as_str();
                if let Err(e) = save_snapshot(&mut *saver.store, key, &snapshot) {
                    saver.save_failures += 1;
                    log::warn!("failed to save progress: {e}");
                }
            }
            drop(saver);
            // A snapshot parked while we held the backend is ours to write.
            if self.pending().is_none() {
                return;
            }
        }
    }

    /// Wipe progress and settings back to a fresh install.
    pub fn reset(&self) -> Transition {
        self.dispatch(Event::ResetAll)
    }

    /// Number of saves that failed since the store was opened.
    pub fn save_failures(&self) -> u64 {
        self.saver().save_failures
    }

    /// Borrow the backing key-value store, e.g. to inspect the saved blob.
    /// Waits for any write in progress.
    pub fn with_store<T>(&self, f: impl FnOnce(&dyn KeyValueStore) -> T) -> T {
        let saver = self.saver();
        f(&*saver.store)
    }

    fn state(&self) -> MutexGuard<'_, ProgressionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn saver(&self) -> MutexGuard<'_, Saver> {
        self.saver.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
