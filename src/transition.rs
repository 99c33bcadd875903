//! Transition descriptors and completion signalling
//!
//! A `TransitionContext` describes one change of the topmost visible
//! window: what is on top before and after, whatever sits underneath on
//! either side, and the kind of change. The stack builds a fresh
//! context immediately before delegating to an animator and considers
//! the transition finished only when the context's [`FinishedSignal`]
//! fires.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::window::ManagedWindow;

/// The kind of topmost-window change a transition performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// A new window is being layered above the current content.
    Push,
    /// One or more managed windows are being removed.
    Pop,
    /// The primary (root) window itself is being replaced.
    Root,
}

type FinalizeFn = Box<dyn FnOnce() + Send>;

/// Single-shot completion signal for one transition.
///
/// Animators must fire this exactly once, after the visual transition
/// is complete (firing synchronously is fine for a skipped animation).
/// The signal is idempotent: the first call runs the stack's finalize
/// step, every later call is a no-op. A signal that is never fired
/// stalls its transition's finalize and completion callback forever;
/// the stack enforces no timeout.
#[derive(Clone)]
pub struct FinishedSignal {
    finalize: Arc<Mutex<Option<FinalizeFn>>>,
}

impl FinishedSignal {
    pub(crate) fn new(finalize: impl FnOnce() + Send + 'static) -> Self {
        Self {
            finalize: Arc::new(Mutex::new(Some(Box::new(finalize)))),
        }
    }

    /// Fire the signal. The first call finalizes the transition;
    /// subsequent calls do nothing.
    pub fn signal(&self) {
        // Take under the lock, run outside it: a finalize step may
        // itself interact with signals.
        let finalize = self.finalize.lock().take();
        if let Some(finalize) = finalize {
            finalize();
        }
    }

    /// Whether the signal has already fired.
    pub fn is_signaled(&self) -> bool {
        self.finalize.lock().is_none()
    }
}

impl fmt::Debug for FinishedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinishedSignal")
            .field("signaled", &self.is_signaled())
            .finish()
    }
}

/// Immutable description of one window transition.
///
/// The window values are snapshots taken when the stack delegated to
/// the animator; stack mutations made while the transition is in
/// flight do not alter them.
#[derive(Debug)]
pub struct TransitionContext {
    /// The topmost visible window the transition starts from.
    pub top_from: ManagedWindow,

    /// The topmost visible window the transition ends on.
    pub top_to: ManagedWindow,

    /// Windows below the top before the transition, ascending by
    /// z-order; `None` when there were none.
    pub underlying_from: Option<Vec<ManagedWindow>>,

    /// Windows below the top after the transition, ascending by
    /// z-order; `None` when there are none.
    pub underlying_to: Option<Vec<ManagedWindow>>,

    /// The kind of change being performed.
    pub kind: TransitionKind,

    finished: FinishedSignal,
}

impl TransitionContext {
    pub(crate) fn new(
        kind: TransitionKind,
        top_from: ManagedWindow,
        top_to: ManagedWindow,
        underlying_from: Option<Vec<ManagedWindow>>,
        underlying_to: Option<Vec<ManagedWindow>>,
        finished: FinishedSignal,
    ) -> Self {
        Self {
            top_from,
            top_to,
            underlying_from,
            underlying_to,
            kind,
            finished,
        }
    }

    /// The transition's completion signal.
    ///
    /// Animators that complete asynchronously clone this and fire it
    /// from wherever their work ends.
    pub fn finished(&self) -> FinishedSignal {
        self.finished.clone()
    }

    /// Convenience for animators that complete in place.
    pub fn finish(&self) {
        self.finished.signal();
    }
}
