//! Cache refresh subsystem.
//!
//! # Data Flow
//! ```text
//! startup:   RefreshScheduler::start → RouteCache::ensure_populated(true)
//! poll tick: clock → DailySchedule::crossed(prev, now)?
//!                  → RouteCache::ensure_populated(true)
//! shutdown:  SchedulerHandle::stop → broadcast → loop exits → join
//! ```
//!
//! # Design Decisions
//! - Four fixed daily checkpoints polled at 1s granularity by default
//! - Crossing detection, not string equality, so a late tick still fires
//! - Retries are the next checkpoint; there is no backoff

pub mod schedule;
pub mod scheduler;

pub use schedule::{parse_checkpoint, DailySchedule};
pub use scheduler::{RefreshScheduler, SchedulerHandle};
