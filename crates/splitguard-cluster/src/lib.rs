//! splitguard-cluster — the local cluster instance SplitGuard protects.
//!
//! `LocalCluster` is an in-process membership registry. Nodes join,
//! heartbeat and leave through the API; members that miss heartbeats
//! for longer than the dead timeout drop out of the live view. It
//! implements `ClusterHandle`, so the split-brain check reads its live
//! view and, on a lost partition, stops every member and fires the
//! stop signal the daemon waits on.

pub mod membership;

pub use membership::{ClusterError, ClusterResult, LocalCluster, Member, MemberStatus};
