//! Partition classification.

use splitguard_core::{Classification, MembershipView};

/// Compare the local and remote views.
///
/// The test is deliberately asymmetric: the local side may know nodes
/// the remote one does not, so `remote ⊆ local` is already in sync.
/// Neither view is modified.
pub fn classify(local: &MembershipView, remote: &MembershipView) -> Classification {
    if remote.is_subset_of(local) {
        Classification::InSync
    } else if local.is_disjoint(remote) {
        Classification::Disjoint
    } else {
        Classification::Overlapping
    }
}
