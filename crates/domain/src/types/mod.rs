//! Domain types

pub mod notification;
pub mod remote;
pub mod sidebar;
pub mod view;

pub use notification::*;
pub use remote::*;
pub use sidebar::*;
pub use view::*;
