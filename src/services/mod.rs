//! Long-running coordination services.
//!
//! [`Broker`] dispatches every context request, [`StatusService`] drives
//! badge pulses and notifications, and [`MaintenanceScheduler`] runs the
//! periodic cache eviction and health check loops.

mod broker;
mod maintenance;
mod status_service;

pub use broker::Broker;
pub use maintenance::{MaintenanceConfig, MaintenanceScheduler};
pub use status_service::{badge_style, BadgeStyle, StatusService, BADGE_CLEAR_DELAY};
