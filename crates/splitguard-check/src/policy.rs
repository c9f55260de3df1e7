//! Remediation policy — which side of a partition stops.

use splitguard_core::{Classification, RemediationDecision};

/// Decide whether the local side must stop its nodes.
///
/// Only a `Disjoint` classification can lead to a shutdown. Within a
/// disjoint split the smaller side always stops; on a tie or when the
/// local side is larger, an explicit `preferred_zone = false` still
/// stops it. With no preference configured a tie keeps both sides up.
pub fn decide(
    classification: Classification,
    local_size: usize,
    remote_size: usize,
    preferred_zone: Option<bool>,
) -> RemediationDecision {
    match classification {
        Classification::InSync | Classification::Overlapping => RemediationDecision::keep(),
        Classification::Disjoint => {
            if local_size < remote_size || preferred_zone == Some(false) {
                RemediationDecision::shutdown()
            } else {
                RemediationDecision::keep()
            }
        }
    }
}
