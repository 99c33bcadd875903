//! # Strata Window Stack Library
//!
//! A small, fixed-depth stack of independently-rendered top-level
//! windows layered above an application's primary window, so transient
//! UI (overlays, modals, alerts) can be presented and dismissed with
//! controlled z-ordering and animated transitions.
//!
//! ## Architecture
//!
//! Strata is built on a modular architecture:
//! - `stack`: The stack/transition manager (push/pop/pop-all, root replacement)
//! - `window`: Window records and the three-slot z-level model
//! - `transition`: Transition descriptors and single-shot completion signals
//! - `animator`: The pluggable transition-animator capability
//! - `association`: Per-window ownership side table
//! - `config`: Configuration parsing and management
//! - `logging`: Logging bootstrap
//!
//! ## Usage
//!
//! ```rust
//! use strata::{StrataConfig, WindowLevel, WindowStack};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = StrataConfig::default();
//!     let stack = WindowStack::new(1, &config)?;
//!
//!     // Present an alert above everything, without animation.
//!     let alert = stack.push(2, WindowLevel::High, None, None);
//!     assert_eq!(stack.controller_at(WindowLevel::High), Some(2));
//!     assert_eq!(stack.topmost_window().id, alert.id);
//!
//!     stack.pop(2, None, None);
//!     Ok(())
//! }
//! ```

pub mod animator;
pub mod association;
pub mod config;
pub mod logging;
pub mod stack;
pub mod transition;
pub mod window;

// Re-export main types for easy access
pub use animator::{ImmediateAnimator, WindowAnimator};
pub use association::{Association, AssociationTable};
pub use config::StrataConfig;
pub use stack::{current_cell, Completion, CurrentStackCell, WindowStack};
pub use transition::{FinishedSignal, TransitionContext, TransitionKind};
pub use window::{ManagedWindow, WindowLevel};

// Re-export common error types
pub use anyhow::{Context, Error, Result};

/// Version information for Strata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
