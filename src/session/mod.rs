//! Remote-desktop session reconciliation.
//!
//! A "session" is never stored by this crate. It is the observation that the
//! provisioning workflow currently has a queued or running run. Every caller
//! re-fetches the recent runs and derives the view from them.
//!
//! # Architecture
//!
//! - [`RunSummary`]: Read-only projection of one upstream workflow run
//! - [`SessionView`]: Derived active/inactive status
//! - [`compute_status`] / [`select_run_to_cancel`]: Pure reconciliation functions
//!
//! # Example
//!
//! ```rust
//! use actions_desktop_panel::session::{SessionView, compute_status};
//!
//! let view = compute_status(&[]);
//! assert_eq!(view, SessionView::Inactive { last_run: None });
//! ```

mod reconciler;
mod run;

pub use reconciler::{SessionView, compute_status, select_run_to_cancel};
pub use run::{RunConclusion, RunId, RunStatus, RunSummary};
