//! Decides whether a resolved snapshot should be evaluated at all.

use crate::models::snapshot::{ResourceSnapshot, ResourceStatus};

/// Whether `snapshot` should be handed to the evaluator.
///
/// Only resources that currently exist (`OK` or `ResourceDiscovered`) and
/// are known to still be in scope are evaluated. An absent scope flag
/// counts as out of scope.
#[must_use]
pub fn is_applicable(snapshot: &ResourceSnapshot, event_left_scope: Option<bool>) -> bool {
    let live = matches!(
        snapshot.status,
        ResourceStatus::Ok | ResourceStatus::ResourceDiscovered
    );
    live && event_left_scope == Some(false)
}
