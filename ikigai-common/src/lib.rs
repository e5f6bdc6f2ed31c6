//! # Ikigai Compass Common Library
//!
//! Shared code for the Ikigai Compass premium services including:
//! - Premium tiers, report features and the tier access resolver
//! - Detailed analysis content for unlocked features
//! - Payment offer mapping and webhook signature verification
//! - Database initialization, migrations and session queries
//! - API authentication helpers and shared response types
//! - Configuration loading

pub mod access;
pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod offers;
pub mod session;
pub mod signature;
pub mod tier;
pub mod time;

pub use access::{resolve_access, resolve_premium_results, AccessError, PremiumResults};
pub use error::{Error, Result};
pub use features::{Feature, FeatureAccess};
pub use session::{TestResults, TestSession};
pub use tier::PremiumTier;
