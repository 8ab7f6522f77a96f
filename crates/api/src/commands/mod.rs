//! Commands - typed entry points over the application context
//!
//! Every command is timed and logged through
//! [`execute_command`](crate::utils::command_helpers::execute_command).

mod events;
mod nudge;
mod stats;
mod tasks;
mod tracking;

pub use events::*;
pub use nudge::*;
pub use stats::*;
pub use tasks::*;
pub use tracking::*;
