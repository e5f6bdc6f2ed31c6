//! Database initialization, migrations and queries

pub mod init;
pub mod migrations;
pub mod payments;
pub mod sessions;
pub mod settings;
pub mod stats;

pub use init::*;
pub use migrations::*;
pub use payments::{assign_tier, AssignmentOutcome, PaymentRecord};
pub use sessions::{complete_session, insert_session, load_session};
pub use settings::RuntimeSettings;
pub use stats::{load_stats, SessionStats, TierCounts};
