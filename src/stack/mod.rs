//! Layered window stack management
//!
//! This module implements the core stack/transition manager: a
//! [`WindowStack`] owns an always-present root window plus up to three
//! overlay windows (low, medium, high) and arbitrates which window is
//! topmost across push/pop/pop-all and root replacement. Transitions
//! between topmost windows are described by a
//! [`TransitionContext`](crate::transition::TransitionContext) and
//! delegated to a caller-supplied animator; the stack finalizes window
//! visibility, key status, and destruction only when the transition's
//! signal fires.
//!
//! The animate-or-skip decision is made synchronously on every call:
//! an operation that does not change the topmost visible window, runs
//! while the application is inactive, is given no animator, or has
//! animations disabled in configuration finalizes immediately.

use anyhow::Result;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use crate::animator::WindowAnimator;
use crate::association::AssociationTable;
use crate::config::StrataConfig;
use crate::transition::{FinishedSignal, TransitionContext, TransitionKind};
use crate::window::{ManagedWindow, WindowLevel};

/// Caller-supplied completion callback, invoked after a transition
/// finalizes (immediately for skipped animations, otherwise once the
/// animator fires the transition's signal).
pub type Completion = Box<dyn FnOnce() + Send>;

type ActiveProbe = Arc<dyn Fn() -> bool + Send + Sync>;

static NEXT_STACK_ID: AtomicU64 = AtomicU64::new(1);

// Stack registry: id -> weak handle. Backs window -> stack lookups
// without letting windows extend a stack's lifetime.
static REGISTRY: OnceLock<Mutex<HashMap<u64, Weak<StackInner>>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<u64, Weak<StackInner>>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Cell naming the stack that currently controls the application's
/// primary window.
///
/// One process-wide cell exists (see [`current_cell`]); tests and
/// embedders that need isolation construct their own and use the
/// `*_in` operation variants.
pub struct CurrentStackCell {
    slot: Mutex<Option<WindowStack>>,
}

impl CurrentStackCell {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Install `stack` as the current one, replacing any previous.
    pub fn install(&self, stack: &WindowStack) {
        *self.slot.lock() = Some(stack.clone());
    }

    /// Explicit teardown: forget the current stack.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// The current stack, if one is installed.
    pub fn get(&self) -> Option<WindowStack> {
        self.slot.lock().clone()
    }
}

impl Default for CurrentStackCell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CurrentStackCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentStackCell")
            .field("installed", &self.get().map(|s| s.id()))
            .finish()
    }
}

static CURRENT_STACK: CurrentStackCell = CurrentStackCell::new();

/// The process-wide current-stack cell.
pub fn current_cell() -> &'static CurrentStackCell {
    &CURRENT_STACK
}

#[derive(Debug)]
struct StackState {
    root: ManagedWindow,
    low: Option<ManagedWindow>,
    medium: Option<ManagedWindow>,
    high: Option<ManagedWindow>,
}

impl StackState {
    fn slot(&self, level: WindowLevel) -> &Option<ManagedWindow> {
        match level {
            WindowLevel::Low => &self.low,
            WindowLevel::Medium => &self.medium,
            WindowLevel::High => &self.high,
        }
    }

    fn slot_mut(&mut self, level: WindowLevel) -> &mut Option<ManagedWindow> {
        match level {
            WindowLevel::Low => &mut self.low,
            WindowLevel::Medium => &mut self.medium,
            WindowLevel::High => &mut self.high,
        }
    }

    /// Occupied windows ascending by z-order, root first. Recomputed on
    /// every call, never cached across mutations.
    fn ordered(&self) -> Vec<ManagedWindow> {
        let mut windows = vec![self.root.clone()];
        for level in WindowLevel::ALL {
            if let Some(window) = self.slot(level) {
                windows.push(window.clone());
            }
        }
        windows
    }

    /// The highest occupied window; the root is the floor.
    fn topmost(&self) -> ManagedWindow {
        for level in [WindowLevel::High, WindowLevel::Medium, WindowLevel::Low] {
            if let Some(window) = self.slot(level) {
                return window.clone();
            }
        }
        self.root.clone()
    }

    fn find_level(&self, controller: u64) -> Option<WindowLevel> {
        WindowLevel::ALL.into_iter().find(|&level| {
            self.slot(level)
                .as_ref()
                .map(|w| w.controller == controller)
                .unwrap_or(false)
        })
    }

    fn all_windows_mut(&mut self) -> Vec<&mut ManagedWindow> {
        let mut windows = vec![&mut self.root];
        for slot in [&mut self.low, &mut self.medium, &mut self.high] {
            if let Some(window) = slot {
                windows.push(window);
            }
        }
        windows
    }

    /// Converge visibility and key status onto the current slots: every
    /// present window shown, the topmost alone key.
    fn sync_presentation(&mut self) {
        let top_id = self.topmost().id;
        for window in self.all_windows_mut() {
            window.visible = true;
            window.key = window.id == top_id;
        }
    }
}

struct StackInner {
    id: u64,
    config: StrataConfig,
    associations: Arc<AssociationTable>,
    active_probe: RwLock<ActiveProbe>,
    state: Mutex<StackState>,
}

impl Drop for StackInner {
    fn drop(&mut self) {
        if let Some(registry) = REGISTRY.get() {
            registry.lock().remove(&self.id);
        }
        // Windows do not outlive their stack's bookkeeping.
        let state = self.state.get_mut();
        self.associations.clear(state.root.id);
        for slot in [&state.low, &state.medium, &state.high] {
            if let Some(window) = slot {
                self.associations.clear(window.id);
            }
        }
    }
}

// Captured inputs for one transition, assembled under the state lock
// and consumed after it is released.
struct TransitionPlan {
    kind: TransitionKind,
    top_from: ManagedWindow,
    top_to: ManagedWindow,
    ordered_from: Vec<ManagedWindow>,
    ordered_to: Vec<ManagedWindow>,
    destroy: Vec<ManagedWindow>,
    active: bool,
}

/// The stack/transition manager for one window hierarchy.
///
/// `WindowStack` is a cheap clonable handle; clones share state. All
/// mutating operations decide synchronously whether to animate, return
/// control to the caller, and finalize either in place or when the
/// delegated animator fires the transition signal. State between those
/// two points is already updated (slots are vacated and filled at
/// accept time), so follow-up calls observe the new logical stack.
#[derive(Clone)]
pub struct WindowStack {
    inner: Arc<StackInner>,
}

impl WindowStack {
    /// Create a stack whose root window displays `root_controller`,
    /// registered in the process-wide association table.
    pub fn new(root_controller: u64, config: &StrataConfig) -> Result<Self> {
        Self::with_table(root_controller, config, AssociationTable::global())
    }

    /// Create a stack registered in an explicitly supplied association
    /// table.
    pub fn with_table(
        root_controller: u64,
        config: &StrataConfig,
        associations: Arc<AssociationTable>,
    ) -> Result<Self> {
        config.validate()?;

        let id = NEXT_STACK_ID.fetch_add(1, Ordering::Relaxed);
        let mut root = ManagedWindow::new(root_controller, None);
        root.key = true;
        associations.set(&root, Some(id), None);

        let inner = Arc::new(StackInner {
            id,
            config: config.clone(),
            associations,
            active_probe: RwLock::new(Arc::new(|| true)),
            state: Mutex::new(StackState {
                root,
                low: None,
                medium: None,
                high: None,
            }),
        });
        registry().lock().insert(id, Arc::downgrade(&inner));

        debug!(
            "Created window stack {} with root controller {}",
            id, root_controller
        );
        Ok(Self { inner })
    }

    /// The stack controlling the application's primary window, or
    /// `None` if the primary window is unmanaged. Side-effect free.
    pub fn current() -> Option<WindowStack> {
        CURRENT_STACK.get()
    }

    /// Install this stack as the process-wide current one.
    pub fn make_current(&self) {
        CURRENT_STACK.install(self);
    }

    /// Explicit teardown of the process-wide current stack.
    pub fn clear_current() {
        CURRENT_STACK.clear();
    }

    /// Resolve the stack owning `window_id` through the process-wide
    /// association table. `None` for unmanaged windows and for windows
    /// whose owning stack is gone.
    pub fn for_window(window_id: u64) -> Option<WindowStack> {
        Self::for_window_in(&AssociationTable::global(), window_id)
    }

    /// [`WindowStack::for_window`] against an explicit table.
    pub fn for_window_in(table: &AssociationTable, window_id: u64) -> Option<WindowStack> {
        let owner = table.get(window_id)?.owner?;
        let inner = registry().lock().get(&owner)?.upgrade()?;
        Some(Self { inner })
    }

    /// Replace the application's primary window with a new stack whose
    /// root displays `controller`, using the process-wide current-stack
    /// cell.
    ///
    /// All windows managed by the previous current stack are destroyed
    /// when the transition finalizes. The new stack is installed as
    /// current before any animator runs.
    pub fn replace_root(
        controller: u64,
        config: &StrataConfig,
        animator: Option<&dyn WindowAnimator>,
        completion: Option<Completion>,
    ) -> Result<WindowStack> {
        Self::replace_root_in(current_cell(), controller, config, animator, completion)
    }

    /// [`WindowStack::replace_root`] against an explicit cell.
    pub fn replace_root_in(
        cell: &CurrentStackCell,
        controller: u64,
        config: &StrataConfig,
        animator: Option<&dyn WindowAnimator>,
        completion: Option<Completion>,
    ) -> Result<WindowStack> {
        let previous = cell.get();

        // The replacement joins the table the outgoing hierarchy lives
        // in, so teardown of the old windows stays observable there.
        let table = previous
            .as_ref()
            .map(|p| Arc::clone(&p.inner.associations))
            .unwrap_or_else(AssociationTable::global);
        let stack = Self::with_table(controller, config, table)?;

        let mut destroy = Vec::new();
        let mut top_from = None;
        let mut ordered_from = Vec::new();
        if let Some(prev) = &previous {
            let mut prev_state = prev.inner.state.lock();
            top_from = Some(prev_state.topmost());
            ordered_from = prev_state.ordered();
            for level in WindowLevel::ALL {
                if let Some(window) = prev_state.slot_mut(level).take() {
                    destroy.push(window);
                }
            }
            destroy.push(prev_state.root.clone());
        }

        // Re-home before the animator runs: the animator may consult
        // the current stack.
        cell.install(&stack);

        let top_to = stack.root_window();
        let top_from = top_from.unwrap_or_else(|| top_to.clone());
        let ordered_to = stack.ordered_windows();
        // The outgoing stack represents the application being replaced;
        // its probe decides whether this counts as a foreground change.
        let active = previous
            .as_ref()
            .map(|p| p.is_active())
            .unwrap_or_else(|| stack.is_active());

        info!(
            "Stack {} replacing root (controller {}), {} outgoing windows",
            stack.id(),
            controller,
            destroy.len()
        );

        stack.run_transition(
            TransitionPlan {
                kind: TransitionKind::Root,
                top_from,
                top_to,
                ordered_from,
                ordered_to,
                destroy,
                active,
            },
            animator,
            completion,
        );

        Ok(stack)
    }

    /// Process-unique id of this stack.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Install the predicate consulted for the application's
    /// active/foreground state. Animation is suppressed whenever it
    /// reports `false`. Defaults to always-active.
    pub fn set_active_probe(&self, probe: impl Fn() -> bool + Send + Sync + 'static) {
        *self.inner.active_probe.write() = Arc::new(probe);
    }

    fn is_active(&self) -> bool {
        let probe = Arc::clone(&self.inner.active_probe.read());
        probe()
    }

    /// The controller occupying `level`, or `None`.
    pub fn controller_at(&self, level: WindowLevel) -> Option<u64> {
        self.inner
            .state
            .lock()
            .slot(level)
            .as_ref()
            .map(|w| w.controller)
    }

    /// All managed controllers including the root's, ascending by
    /// level.
    pub fn controllers(&self) -> Vec<u64> {
        self.ordered_windows()
            .iter()
            .map(|w| w.controller)
            .collect()
    }

    /// Snapshot of the occupied windows ascending by z-order, root
    /// first.
    pub fn ordered_windows(&self) -> Vec<ManagedWindow> {
        self.inner.state.lock().ordered()
    }

    /// Snapshot of the topmost window (the root when no level is
    /// occupied).
    pub fn topmost_window(&self) -> ManagedWindow {
        self.inner.state.lock().topmost()
    }

    /// Snapshot of the window at `level`, or `None`.
    pub fn window_at(&self, level: WindowLevel) -> Option<ManagedWindow> {
        self.inner.state.lock().slot(level).clone()
    }

    /// Snapshot of the root window.
    pub fn root_window(&self) -> ManagedWindow {
        self.inner.state.lock().root.clone()
    }

    /// Create and present a new window for `controller` at `level`.
    ///
    /// If a window already occupies `level` it is detached and
    /// destroyed at finalize; its controller's teardown remains the
    /// caller's responsibility. The returned window is associated with
    /// this stack before any animator runs.
    pub fn push(
        &self,
        controller: u64,
        level: WindowLevel,
        animator: Option<&dyn WindowAnimator>,
        completion: Option<Completion>,
    ) -> ManagedWindow {
        let active = self.is_active();
        let (plan, window) = {
            let mut state = self.inner.state.lock();
            let top_from = state.topmost();
            let ordered_from = state.ordered();

            let replaced = state.slot_mut(level).take();
            let window = ManagedWindow::new(controller, Some(level));
            self.inner
                .associations
                .set(&window, Some(self.inner.id), Some(level));
            *state.slot_mut(level) = Some(window.clone());

            let top_to = state.topmost();
            let ordered_to = state.ordered();
            debug!(
                "Stack {}: push controller {} at {:?} (top {} -> {})",
                self.inner.id, controller, level, top_from.id, top_to.id
            );

            (
                TransitionPlan {
                    kind: TransitionKind::Push,
                    top_from,
                    top_to,
                    ordered_from,
                    ordered_to,
                    destroy: replaced.into_iter().collect(),
                    active,
                },
                window,
            )
        };

        self.run_transition(plan, animator, completion);
        window
    }

    /// Dismiss the window displaying `controller`.
    ///
    /// Returns `false` (touching nothing, invoking nothing) when the
    /// controller is not currently managed by this stack. On success
    /// the slot is vacated immediately; the window itself is destroyed
    /// at finalize.
    pub fn pop(
        &self,
        controller: u64,
        animator: Option<&dyn WindowAnimator>,
        completion: Option<Completion>,
    ) -> bool {
        let active = self.is_active();
        let plan = {
            let mut state = self.inner.state.lock();
            let Some(level) = state.find_level(controller) else {
                debug!(
                    "Stack {}: pop of unmanaged controller {} refused",
                    self.inner.id, controller
                );
                return false;
            };
            let top_from = state.topmost();
            let ordered_from = state.ordered();

            let Some(removed) = state.slot_mut(level).take() else {
                return false;
            };

            let top_to = state.topmost();
            let ordered_to = state.ordered();
            debug!(
                "Stack {}: pop controller {} from {:?} (top {} -> {})",
                self.inner.id, controller, level, top_from.id, top_to.id
            );

            TransitionPlan {
                kind: TransitionKind::Pop,
                top_from,
                top_to,
                ordered_from,
                ordered_to,
                destroy: vec![removed],
                active,
            }
        };

        self.run_transition(plan, animator, completion);
        true
    }

    /// Dismiss every managed window in one batch transition.
    ///
    /// Returns the popped controllers ascending by level; empty when
    /// nothing was managed. The completion callback still fires in that
    /// case: the transition degenerates to the synchronous no-op path.
    pub fn pop_all(
        &self,
        animator: Option<&dyn WindowAnimator>,
        completion: Option<Completion>,
    ) -> Vec<u64> {
        let active = self.is_active();
        let (plan, controllers) = {
            let mut state = self.inner.state.lock();
            let top_from = state.topmost();
            let ordered_from = state.ordered();

            let mut popped = Vec::new();
            for level in WindowLevel::ALL {
                if let Some(window) = state.slot_mut(level).take() {
                    popped.push(window);
                }
            }
            let controllers: Vec<u64> = popped.iter().map(|w| w.controller).collect();

            let top_to = state.topmost();
            let ordered_to = state.ordered();
            debug!(
                "Stack {}: pop_all removing {} windows (top {} -> {})",
                self.inner.id,
                popped.len(),
                top_from.id,
                top_to.id
            );

            (
                TransitionPlan {
                    kind: TransitionKind::Pop,
                    top_from,
                    top_to,
                    ordered_from,
                    ordered_to,
                    destroy: popped,
                    active,
                },
                controllers,
            )
        };

        self.run_transition(plan, animator, completion);
        controllers
    }

    // Decide animate-or-skip and either delegate to the animator or
    // finalize on the spot. Must be called without the state lock held:
    // the animator may fire the signal synchronously, and finalize
    // re-enters the state.
    fn run_transition(
        &self,
        plan: TransitionPlan,
        animator: Option<&dyn WindowAnimator>,
        completion: Option<Completion>,
    ) {
        let animate = plan.top_from.id != plan.top_to.id
            && self.inner.config.animation.enabled
            && plan.active
            && animator.is_some();

        match (animate, animator) {
            (true, Some(animator)) => {
                let leaving: Vec<u64> = plan.destroy.iter().map(|w| w.id).collect();
                let underlying_from = self.underlying(plan.ordered_from, &plan.top_from, &[]);
                let underlying_to = self.underlying(plan.ordered_to, &plan.top_to, &leaving);
                let signal = self.finalize_signal(plan.destroy, completion);
                let context = TransitionContext::new(
                    plan.kind,
                    plan.top_from,
                    plan.top_to,
                    underlying_from,
                    underlying_to,
                    signal,
                );
                animator.animate_transition(context);
            }
            _ => self.finalize_signal(plan.destroy, completion).signal(),
        }
    }

    // Windows below `top`, ascending; merged with externally registered
    // windows unless configuration says to ignore them. `exclude` lists
    // windows leaving the hierarchy in this transition.
    fn underlying(
        &self,
        ordered: Vec<ManagedWindow>,
        top: &ManagedWindow,
        exclude: &[u64],
    ) -> Option<Vec<ManagedWindow>> {
        let mut windows = ordered;
        if !self.inner.config.stack.ignore_unmanaged {
            let present: HashSet<u64> = windows.iter().map(|w| w.id).collect();
            let foreign = self
                .inner
                .associations
                .windows()
                .into_iter()
                .filter(|(_, a)| a.owner != Some(self.inner.id))
                .map(|(w, _)| w)
                .filter(|w| !present.contains(&w.id) && !exclude.contains(&w.id));
            windows.extend(foreign);
            windows.sort_by_key(|w| (w.z_index(), w.id));
        }
        windows.retain(|w| w.id != top.id && !exclude.contains(&w.id));
        if windows.is_empty() {
            None
        } else {
            Some(windows)
        }
    }

    // Build the single-shot finalize for one transition: destroy the
    // windows that left the hierarchy, converge visibility/key on the
    // live slots, then notify the caller. Holds only a weak handle so a
    // dropped stack cannot be revived by a late-firing animator.
    fn finalize_signal(
        &self,
        destroy: Vec<ManagedWindow>,
        completion: Option<Completion>,
    ) -> FinishedSignal {
        let weak = Arc::downgrade(&self.inner);
        let associations = Arc::clone(&self.inner.associations);
        FinishedSignal::new(move || {
            for window in &destroy {
                associations.clear(window.id);
                debug!(
                    "Destroyed window {} (controller {})",
                    window.id, window.controller
                );
            }
            if let Some(inner) = weak.upgrade() {
                inner.state.lock().sync_presentation();
            }
            if let Some(completion) = completion {
                completion();
            }
        })
    }
}

impl PartialEq for WindowStack {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for WindowStack {}

impl fmt::Debug for WindowStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("WindowStack")
            .field("id", &self.inner.id)
            .field("root", &state.root.id)
            .field("low", &state.low.as_ref().map(|w| w.id))
            .field("medium", &state.medium.as_ref().map(|w| w.id))
            .field("high", &state.high.as_ref().map(|w| w.id))
            .finish()
    }
}


#[cfg(test)]
mod property_tests;
