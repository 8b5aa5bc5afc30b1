//! Core types for succession plans: records, key layout, view projections, dashboard state.

pub mod error;
pub mod keys;
pub mod plan;
pub mod state;
pub mod view;

pub use error::{TransactionError, ValidationError};
pub use plan::{PlanInput, ReadinessLevel, Record, SealedScore, StoredPlan, ValidPlan};
pub use state::{Action, AppState, Banner, TxStatus};
