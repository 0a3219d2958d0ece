//! Sync engine: store/remote ports, full resync and per-action
//! reconciliation.

pub mod actions;
pub mod ports;
pub mod resync;
pub mod tasks;

pub use actions::{ActionPlan, RemoteMutation};
pub use resync::{ResyncConfig, ResyncCoordinator, ResyncOptions, ResyncOutcome, SyncPhase};
pub use tasks::{TaskOutcome, TaskQueue, TaskSender};
