//! Canvas readiness synchronizer.
//!
//! # Responsibility
//! - Fetch the saved drawing once per mount, then poll for the widget handle
//!   with a bounded wait and apply the drawing exactly once.
//! - Persist stroke completions and clears through `DrawingStore`.
//!
//! # Invariants
//! - `Idle -> FetchingSavedDrawing -> AwaitingWidgetReady` then one of
//!   `Loaded`, `LoadedEmpty`, `Abandoned` or `Detached`; an unmount during
//!   the fetch goes straight to `Detached`.
//! - The widget may only be rendered after `FetchingSavedDrawing` is left.
//! - A stroke save never overwrites a non-empty saved drawing that has not
//!   been applied to the widget.
//! - Teardown is deterministic: `unmount` cancels the live run, fetch or poll.

use crate::config::CanvasConfig;
use crate::model::stroke::Drawing;
use crate::repo::kv_store::KeyValueStore;
use crate::service::drawing_store::DrawingStore;
use crate::sync::surface::SurfaceSlot;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Lifecycle of one canvas view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    FetchingSavedDrawing,
    AwaitingWidgetReady,
    /// Saved drawing applied to the widget.
    Loaded,
    /// Widget ready, nothing was saved.
    LoadedEmpty,
    /// Widget never became available within the timeout.
    Abandoned,
    /// View unmounted before the load decision was applied.
    Detached,
}

impl SyncPhase {
    /// True once the load decision for this run is final.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            Self::Loaded | Self::LoadedEmpty | Self::Abandoned | Self::Detached
        )
    }

    /// True once the widget may be constructed.
    pub fn may_render(self) -> bool {
        !matches!(self, Self::Idle | Self::FetchingSavedDrawing)
    }
}

/// Result of a stroke-completion save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Full document handed to the store (the store may still drop it).
    Saved { paths: usize },
    /// Saving now could overwrite a drawing not yet applied.
    Suppressed,
    /// No widget handle to export from.
    NoSurface,
    /// The widget failed to export its paths.
    ExportFailed,
}

/// Owner of the in-session drawing for one canvas view.
pub struct CanvasSynchronizer<K: KeyValueStore> {
    store: DrawingStore<K>,
    config: CanvasConfig,
    phase: watch::Sender<SyncPhase>,
    saved: Mutex<Drawing>,
    run_token: Mutex<CancellationToken>,
    clear_generation: AtomicU64,
    fetch_done: AtomicBool,
}

impl<K: KeyValueStore> CanvasSynchronizer<K> {
    pub fn new(store: DrawingStore<K>, config: CanvasConfig) -> Self {
        let (phase, _) = watch::channel(SyncPhase::Idle);
        Self {
            store,
            config,
            phase,
            saved: Mutex::new(Drawing::new()),
            run_token: Mutex::new(CancellationToken::new()),
            clear_generation: AtomicU64::new(0),
            fetch_done: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncPhase> {
        self.phase.subscribe()
    }

    pub fn surface_may_render(&self) -> bool {
        self.phase().may_render()
    }

    /// Resolves once the widget may be rendered.
    pub async fn wait_until_renderable(&self) {
        let mut phases = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = phases.wait_for(|phase| phase.may_render()).await;
    }

    /// In-memory copy of the drawing last loaded, saved or cleared.
    pub fn saved_drawing(&self) -> Drawing {
        self.saved_lock().clone()
    }

    pub fn store(&self) -> &DrawingStore<K> {
        &self.store
    }

    /// Runs the mount sequence: one fetch, then the bounded widget poll.
    ///
    /// Only valid from `Idle`; any other phase is returned unchanged.
    pub async fn mount(&self, slot: &SurfaceSlot) -> SyncPhase {
        let phase = self.phase();
        if phase != SyncPhase::Idle {
            warn!("event=canvas_mount module=canvas status=skipped phase={phase:?}");
            return phase;
        }
        let token = self.begin_run();
        self.fetch_then_poll(slot, token).await
    }

    /// Restarts the widget poll with the in-memory drawing.
    ///
    /// Used when the widget is rebuilt inside a live view. The fetch is only
    /// repeated when an earlier unmount interrupted it.
    pub async fn remount(&self, slot: &SurfaceSlot) -> SyncPhase {
        match self.phase() {
            SyncPhase::Idle => self.mount(slot).await,
            SyncPhase::FetchingSavedDrawing => SyncPhase::FetchingSavedDrawing,
            _ => {
                let token = self.begin_run();
                if self.fetch_done.load(Ordering::SeqCst) {
                    self.await_surface(slot, token).await
                } else {
                    self.fetch_then_poll(slot, token).await
                }
            }
        }
    }

    /// Tears down the live run, whether it is fetching or polling.
    pub fn unmount(&self) {
        self.run_token_lock().cancel();
        if matches!(
            self.phase(),
            SyncPhase::FetchingSavedDrawing | SyncPhase::AwaitingWidgetReady
        ) {
            self.transition(SyncPhase::Detached);
        }
    }

    /// Saves the widget's full document after a completed stroke.
    pub async fn on_stroke_complete(&self, slot: &SurfaceSlot) -> SaveOutcome {
        if !self.saves_enabled() {
            debug!(
                "event=canvas_save module=canvas status=suppressed phase={:?}",
                self.phase()
            );
            return SaveOutcome::Suppressed;
        }
        let Some(surface) = slot.current() else {
            return SaveOutcome::NoSurface;
        };

        let paths = match surface.export_paths().await {
            Ok(paths) => paths,
            Err(err) => {
                warn!(
                    "event=canvas_save module=canvas status=error error_code=export_failed error={err}"
                );
                return SaveOutcome::ExportFailed;
            }
        };

        self.store.save_drawing(&paths).await;
        let count = paths.len();
        *self.saved_lock() = Drawing::from(paths);
        SaveOutcome::Saved { paths: count }
    }

    /// Clears the widget and the saved drawing.
    ///
    /// The in-memory drawing is emptied first so a later poll run cannot
    /// bring old strokes back.
    pub async fn clear(&self, slot: &SurfaceSlot) {
        self.clear_generation.fetch_add(1, Ordering::SeqCst);
        *self.saved_lock() = Drawing::new();
        if let Some(surface) = slot.current() {
            surface.clear_canvas();
        }
        self.store.save_drawing(&[]).await;
        info!("event=canvas_clear module=canvas status=ok");
    }

    /// Steps the widget's own history back; no-op without a widget.
    pub fn undo(&self, slot: &SurfaceSlot) -> bool {
        let Some(surface) = slot.current() else {
            return false;
        };
        surface.undo();
        true
    }

    /// Switches between pen and eraser; no-op without a widget.
    pub fn set_eraser(&self, slot: &SurfaceSlot, enabled: bool) -> bool {
        let Some(surface) = slot.current() else {
            return false;
        };
        surface.erase_mode(enabled);
        true
    }

    fn saves_enabled(&self) -> bool {
        if !self.fetch_done.load(Ordering::SeqCst) {
            return false;
        }
        match self.phase() {
            SyncPhase::Idle | SyncPhase::FetchingSavedDrawing => false,
            SyncPhase::Loaded | SyncPhase::LoadedEmpty => true,
            SyncPhase::AwaitingWidgetReady | SyncPhase::Abandoned | SyncPhase::Detached => {
                self.saved_lock().is_empty()
            }
        }
    }

    // Cancels any previous run and installs the token for a new one.
    fn begin_run(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self.run_token_lock();
        current.cancel();
        *current = token.clone();
        token
    }

    async fn fetch_then_poll(&self, slot: &SurfaceSlot, token: CancellationToken) -> SyncPhase {
        self.transition(SyncPhase::FetchingSavedDrawing);
        let generation = self.clear_generation.load(Ordering::SeqCst);

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("event=canvas_mount module=canvas status=cancelled stage=fetch");
                return self.phase();
            }
            fetched = self.store.get_saved_drawing() => fetched.unwrap_or_default(),
        };

        // A clear issued while the fetch was in flight wins over the fetch.
        if self.clear_generation.load(Ordering::SeqCst) == generation {
            *self.saved_lock() = fetched;
        } else {
            debug!("event=canvas_mount module=canvas status=ok detail=cleared_during_fetch");
        }
        self.fetch_done.store(true, Ordering::SeqCst);

        self.await_surface(slot, token).await
    }

    async fn await_surface(&self, slot: &SurfaceSlot, token: CancellationToken) -> SyncPhase {
        if token.is_cancelled() {
            return self.phase();
        }
        self.transition(SyncPhase::AwaitingWidgetReady);

        let poll_interval = self.config.poll_interval();
        let started = Instant::now();
        let mut ticker = interval_at(started + poll_interval, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = sleep(self.config.ready_timeout());
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("event=canvas_poll module=canvas status=cancelled");
                    return self.phase();
                }
                _ = &mut deadline => {
                    warn!(
                        "event=canvas_poll module=canvas status=timeout waited_ms={}",
                        started.elapsed().as_millis()
                    );
                    return self.transition(SyncPhase::Abandoned);
                }
                _ = ticker.tick() => {
                    let Some(surface) = slot.current() else {
                        continue;
                    };
                    let saved = self.saved_drawing();
                    let next = if saved.is_empty() {
                        SyncPhase::LoadedEmpty
                    } else {
                        surface.load_paths(saved.paths());
                        SyncPhase::Loaded
                    };
                    info!(
                        "event=canvas_poll module=canvas status=ok paths={} waited_ms={}",
                        saved.len(),
                        started.elapsed().as_millis()
                    );
                    return self.transition(next);
                }
            }
        }
    }

    fn transition(&self, next: SyncPhase) -> SyncPhase {
        let previous = self.phase.send_replace(next);
        if previous != next {
            debug!("event=canvas_phase module=canvas from={previous:?} to={next:?}");
        }
        next
    }

    fn saved_lock(&self) -> MutexGuard<'_, Drawing> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run_token_lock(&self) -> MutexGuard<'_, CancellationToken> {
        self.run_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
