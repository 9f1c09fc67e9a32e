//! branchweave-core: Pure Rust branch range logic without DOM dependencies.
//!
//! This crate provides:
//! - `IdentityIndex` - id to position lookup for one enumeration pass
//! - `mark_ranges` / `assign_roles` - the start/mid/end role computation
//! - `BranchSession<S>` - the pending-start state machine over a `PairStore`
//! - `SiteKind` - selector tables for the supported chat sites
//! - `run_pass` - one full enumerate, index, load, mark pass over a `MessageSource`

pub mod adapter;
pub mod config;
pub mod error;
pub mod index;
pub mod marker;
pub mod pass;
pub mod platform;
pub mod session;
pub mod store;
pub mod types;

pub use adapter::{SiteKind, SiteSelectors};
pub use config::BranchConfig;
pub use error::{BranchError, InteractionError, StoreError};
pub use index::IdentityIndex;
pub use marker::{MarkSummary, assign_roles, mark_ranges};
pub use pass::{PassReport, run_pass};
pub use platform::{MessageSource, RoleTagging};
pub use session::{BranchSession, PendingStart, RemoveOutcome};
pub use smol_str::SmolStr;
pub use store::{MemoryPairStore, PairStore};
pub use types::{MessageId, RangePair, Role, RoleAssignment};
