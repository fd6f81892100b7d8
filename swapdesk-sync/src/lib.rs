//! # swapdesk-sync
//!
//! Keeps a live projection of the swap daemon's state.
//!
//! - [`selector`] races candidate endpoints through a [`probe::Prober`]
//! - [`bootstrap`] brings the daemon's context up once, with one retry
//! - [`hub`] projects daemon events into the [`store::StatusStore`]
//! - [`actions`] are the explicit fetch paths behind every projection
//! - [`session`] wires all of the above for one process lifetime

pub mod actions;
pub mod bootstrap;
pub mod error;
pub mod hub;
pub mod probe;
pub mod selector;
pub mod session;
pub mod store;

pub use actions::Actions;
pub use bootstrap::{BootstrapOutcome, Bootstrapper};
pub use error::SyncError;
pub use hub::Projector;
pub use probe::{DaemonProber, Prober};
pub use selector::{probe_all, select, select_all, ResolvedEndpoints};
pub use session::Session;
pub use store::{AppState, StatusStore};
