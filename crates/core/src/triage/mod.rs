//! Triage state machine.
//!
//! [`reduce`] is a pure `(AppState, Event) -> (AppState, Vec<Command>)`
//! function. [`CommandExecutor`] turns commands into store writes and
//! background tasks, and [`Runtime`] feeds the resulting events back in.

pub mod event;
pub mod executor;
pub mod reducer;
pub mod runtime;
pub mod sidebar;
pub mod state;

pub use event::{Command, Event, ViewSnapshot};
pub use executor::CommandExecutor;
pub use reducer::reduce;
pub use runtime::Runtime;
pub use sidebar::build_sidebar;
pub use state::{AppState, Focus, SidebarSelection};
