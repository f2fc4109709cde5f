pub mod auth_handler;
pub mod employees_handler;
pub mod entries_handler;
pub mod health;
pub mod lookups_handler;
pub mod metrics;
pub mod pay_periods_handler;
pub mod reports_handler;
pub mod timesheets_handler;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};
