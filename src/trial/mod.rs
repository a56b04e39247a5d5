//! Trial tracking core
//!
//! ## Schema Overview
//!
//! ```text
//! TrialRecord { project, experiment, timestamp, success,
//!               datastreams, plots, parameters }
//!       │
//!       ├── TrialRepository   create / find_latest / mark_success /
//!       │                     attach_artifact / list_distinct
//!       └── SelectorSet       distinct parameter values for filter UIs
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trialdb::{MemoryRecordStore, TrialRepository};
//!
//! # async fn example() -> trialdb::Result<()> {
//! let repo = TrialRepository::new(MemoryRecordStore::new());
//!
//! let id = repo
//!     .create(&serde_json::json!({
//!         "project": "vision",
//!         "experiment": "augmentation",
//!         "timestamp": "2024-05-01T10:00:00Z",
//!         "lr": "0.01",
//!     }))
//!     .await?;
//!
//! repo.mark_success(&id).await?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod record;
mod repository;
mod selector;
mod value;

pub use record::{parse_timestamp, ArtifactKind, TrialRecord, TrialRecordBuilder};
pub use repository::TrialRepository;
pub use selector::SelectorSet;
pub use value::Value;
