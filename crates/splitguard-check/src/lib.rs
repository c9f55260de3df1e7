//! splitguard-check — split-brain detection and self-remediation.
//!
//! Compares the local cluster's membership with the view reported by a
//! peer zone and stops the local nodes when a true partition is found
//! and the local side loses the tie-break.
//!
//! # Architecture
//!
//! ```text
//! CheckRunner (fixed interval, one check at a time)
//!   └── SplitBrainCheck::run_once()
//!       ├── RemoteViewFetcher::fetch()  → remote MembershipView
//!       ├── ClusterHandle::current_members() → local MembershipView
//!       ├── classify()  → InSync | Disjoint | Overlapping
//!       ├── decide()    → RemediationDecision
//!       └── ShutdownExecutor::shutdown() (only when deciding to stop)
//! ```
//!
//! # Tie-break
//!
//! Only disjoint views are acted on. The smaller side stops; a side
//! explicitly configured with `preferred_zone = false` stops even when
//! it is not smaller. An equal split with no preference keeps both
//! sides running.

pub mod check;
pub mod classifier;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod policy;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use check::{evaluate, CheckOutcome, SplitBrainCheck};
pub use classifier::classify;
pub use error::{CheckError, CheckResult, FetchError, FetchResult};
pub use executor::ShutdownExecutor;
pub use fetcher::RemoteViewFetcher;
pub use policy::decide;
pub use runner::{CheckRunner, RunnerExit};
