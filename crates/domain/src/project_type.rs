use std::collections::HashSet;

use fieldtrack_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{ProjectTypeId, StageId};

/// One step of a workflow template, evidenced by exactly one photo per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    id: StageId,
    name: NonEmptyString,
    order: u32,
    is_required: bool,
}

impl StageDefinition {
    /// Creates a validated stage definition.
    pub fn new(
        id: StageId,
        name: impl Into<String>,
        order: u32,
        is_required: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            order,
            is_required,
        })
    }

    /// Returns the stage identifier.
    #[must_use]
    pub fn id(&self) -> StageId {
        self.id
    }

    /// Returns the stage display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the position of the stage in its template.
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Returns whether the stage counts towards item completion.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }
}

/// Named workflow template owning an ordered sequence of stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectType {
    id: ProjectTypeId,
    name: NonEmptyString,
    unit_name: NonEmptyString,
    description: Option<String>,
    stages: Vec<StageDefinition>,
}

impl ProjectType {
    /// Creates a validated project type.
    ///
    /// Stage orders must be unique; stages are stored sorted by order.
    pub fn new(
        id: ProjectTypeId,
        name: impl Into<String>,
        unit_name: impl Into<String>,
        description: Option<String>,
        mut stages: Vec<StageDefinition>,
    ) -> AppResult<Self> {
        let mut seen_orders = HashSet::new();
        let mut seen_ids = HashSet::new();
        for stage in &stages {
            if !seen_orders.insert(stage.order()) {
                return Err(AppError::Validation(format!(
                    "stage order {} is used more than once",
                    stage.order()
                )));
            }
            if !seen_ids.insert(stage.id()) {
                return Err(AppError::Validation(format!(
                    "stage id '{}' is used more than once",
                    stage.id()
                )));
            }
        }

        stages.sort_by_key(StageDefinition::order);

        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            unit_name: NonEmptyString::new(unit_name)?,
            description: description.filter(|value| !value.trim().is_empty()),
            stages,
        })
    }

    /// Returns the template identifier.
    #[must_use]
    pub fn id(&self) -> ProjectTypeId {
        self.id
    }

    /// Returns the template name (e.g. "Solar Lights").
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the label used for fallback item identifiers (e.g. "Pole").
    #[must_use]
    pub fn unit_name(&self) -> &str {
        self.unit_name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns stages in ascending order.
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Looks up a stage by identifier.
    #[must_use]
    pub fn stage(&self, stage_id: StageId) -> Option<&StageDefinition> {
        self.stages.iter().find(|stage| stage.id() == stage_id)
    }
}
