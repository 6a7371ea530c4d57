//! Stage sequencing and completion rules.
//!
//! Everything here is recomputed from the evidence set on each call; lock
//! state is never stored.

use std::collections::HashSet;

use serde::Serialize;

use crate::{StageDefinition, StageId};

/// Display lock state of one stage for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageLock<'a> {
    /// The stage.
    pub stage: &'a StageDefinition,
    /// Whether the stage is shown as locked.
    pub is_locked: bool,
}

/// Outcome of the evidence acceptance gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageGate {
    /// Evidence may be uploaded.
    Allow,
    /// Earlier stages lack evidence.
    Reject {
        /// Names of every earlier stage without evidence, ascending by order.
        missing_stages: Vec<String>,
    },
}

/// Computes display locks for stages sorted by ascending order.
///
/// The first stage is never locked. Any later stage is locked exactly when
/// its immediate predecessor has no evidence.
#[must_use]
pub fn compute_stage_locks<'a>(
    stages: &'a [StageDefinition],
    evidenced: &HashSet<StageId>,
) -> Vec<StageLock<'a>> {
    stages
        .iter()
        .enumerate()
        .map(|(position, stage)| StageLock {
            stage,
            is_locked: position > 0 && !evidenced.contains(&stages[position - 1].id()),
        })
        .collect()
}

/// Decides whether evidence for `target` may be accepted.
///
/// Unlike the display lock, this checks every stage ordered before the
/// target, required or not.
#[must_use]
pub fn can_accept(
    target: &StageDefinition,
    stages: &[StageDefinition],
    evidenced: &HashSet<StageId>,
) -> StageGate {
    let mut missing = stages
        .iter()
        .filter(|stage| stage.order() < target.order() && !evidenced.contains(&stage.id()))
        .collect::<Vec<_>>();
    missing.sort_by_key(|stage| stage.order());

    if missing.is_empty() {
        return StageGate::Allow;
    }

    StageGate::Reject {
        missing_stages: missing
            .into_iter()
            .map(|stage| stage.name().to_owned())
            .collect(),
    }
}

/// Returns whether every required stage has evidence.
#[must_use]
pub fn item_is_complete(stages: &[StageDefinition], evidenced: &HashSet<StageId>) -> bool {
    stages
        .iter()
        .filter(|stage| stage.is_required())
        .all(|stage| evidenced.contains(&stage.id()))
}

/// Returns `floor(100 * completed / total)`, or 0 for an empty project.
#[must_use]
pub fn project_progress_percent(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }

    let percent = completed.min(total).saturating_mul(100) / total;
    u8::try_from(percent).unwrap_or(100)
}
