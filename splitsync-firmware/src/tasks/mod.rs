//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod forward;
pub mod report;
pub mod tick;

pub use forward::forward_task;
pub use report::report_task;
pub use tick::tick_task;
