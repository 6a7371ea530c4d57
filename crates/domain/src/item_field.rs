use std::collections::{BTreeMap, BTreeSet, HashSet};

use fieldtrack_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{FieldDefinitionId, ItemId, ProjectId};

/// Maximum stored length of one custom field answer.
pub const FIELD_VALUE_MAX_LENGTH: usize = 255;

/// Input type of a custom per-item question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text answer.
    Text,
    /// Answer picked from the distinct values of a data file column.
    DropdownFromColumn {
        /// Column header in the project's data file.
        column: String,
    },
}

impl FieldKind {
    /// Returns a stable storage value for the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::DropdownFromColumn { .. } => "dropdown",
        }
    }

    /// Returns the backing column for dropdown fields.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Text => None,
            Self::DropdownFromColumn { column } => Some(column.as_str()),
        }
    }

    /// Rebuilds a kind from its storage columns.
    pub fn from_storage(kind: &str, column: Option<String>) -> AppResult<Self> {
        match (kind, column) {
            ("text", _) => Ok(Self::Text),
            ("dropdown", Some(column)) if !column.trim().is_empty() => {
                Ok(Self::DropdownFromColumn { column })
            }
            ("dropdown", _) => Err(AppError::Validation(
                "dropdown fields require a data file column".to_owned(),
            )),
            (other, _) => Err(AppError::Validation(format!(
                "unknown field kind '{other}'"
            ))),
        }
    }
}

/// Custom question asked for every new item of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFieldDefinition {
    id: FieldDefinitionId,
    project_id: ProjectId,
    label: NonEmptyString,
    kind: FieldKind,
    is_grouping_key: bool,
    is_required: bool,
}

impl ItemFieldDefinition {
    /// Creates a validated field definition. Fields start out required.
    pub fn new(
        id: FieldDefinitionId,
        project_id: ProjectId,
        label: impl Into<String>,
        kind: FieldKind,
        is_grouping_key: bool,
    ) -> AppResult<Self> {
        if let FieldKind::DropdownFromColumn { column } = &kind
            && column.trim().is_empty()
        {
            return Err(AppError::Validation(
                "dropdown fields require a data file column".to_owned(),
            ));
        }

        Ok(Self {
            id,
            project_id,
            label: NonEmptyString::new(label)?,
            kind,
            is_grouping_key,
            is_required: true,
        })
    }

    /// Sets whether an answer must be captured for every new item.
    #[must_use]
    pub fn with_required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    /// Returns the field identifier.
    #[must_use]
    pub fn id(&self) -> FieldDefinitionId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the question label (e.g. "Village").
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the input kind.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns whether this field buckets items for naming and display.
    #[must_use]
    pub fn is_grouping_key(&self) -> bool {
        self.is_grouping_key
    }

    /// Returns whether a blank answer is rejected.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }
}

/// Captured answer to one custom question for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFieldValue {
    /// Item the answer belongs to.
    pub item_id: ItemId,
    /// Question being answered.
    pub field_id: FieldDefinitionId,
    /// Answer text.
    pub value: String,
}

/// Validated answers captured for a new item, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedFieldValues(BTreeMap<FieldDefinitionId, String>);

impl CapturedFieldValues {
    /// Returns the answer for a field.
    #[must_use]
    pub fn get(&self, field_id: FieldDefinitionId) -> Option<&str> {
        self.0.get(&field_id).map(String::as_str)
    }

    /// Binds the answers to a persisted item.
    #[must_use]
    pub fn into_values(self, item_id: ItemId) -> Vec<ItemFieldValue> {
        self.0
            .into_iter()
            .map(|(field_id, value)| ItemFieldValue {
                item_id,
                field_id,
                value,
            })
            .collect()
    }
}

/// The full set of custom questions of a project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemFieldSchema {
    definitions: Vec<ItemFieldDefinition>,
}

impl ItemFieldSchema {
    /// Creates a schema, enforcing at most one grouping key.
    pub fn new(definitions: Vec<ItemFieldDefinition>) -> AppResult<Self> {
        let grouping_keys = definitions
            .iter()
            .filter(|definition| definition.is_grouping_key())
            .count();
        if grouping_keys > 1 {
            return Err(AppError::Validation(format!(
                "at most one field may be the grouping key, found {grouping_keys}"
            )));
        }

        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.id()) {
                return Err(AppError::Validation(format!(
                    "field definition '{}' is listed more than once",
                    definition.id()
                )));
            }
        }

        Ok(Self { definitions })
    }

    /// Returns every definition.
    #[must_use]
    pub fn definitions(&self) -> &[ItemFieldDefinition] {
        &self.definitions
    }

    /// Returns the grouping-key field, if configured.
    #[must_use]
    pub fn grouping_field(&self) -> Option<&ItemFieldDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.is_grouping_key())
    }

    /// Validates raw answers for a new item.
    ///
    /// Required fields must be answered; blank answers to optional fields
    /// are dropped. Dropdown answers must be one of the available options
    /// whenever options could be loaded for that field.
    pub fn validate_values(
        &self,
        raw_values: &BTreeMap<FieldDefinitionId, String>,
        dropdown_options: &BTreeMap<FieldDefinitionId, BTreeSet<String>>,
    ) -> AppResult<CapturedFieldValues> {
        if let Some(unknown) = raw_values
            .keys()
            .find(|field_id| !self.definitions.iter().any(|def| def.id() == **field_id))
        {
            return Err(AppError::Validation(format!(
                "field '{unknown}' is not defined for this project"
            )));
        }

        let mut captured = BTreeMap::new();
        for definition in &self.definitions {
            let Some(value) = raw_values
                .get(&definition.id())
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
            else {
                if definition.is_required() {
                    return Err(AppError::Validation(format!(
                        "field '{}' is required",
                        definition.label()
                    )));
                }
                continue;
            };

            if value.chars().count() > FIELD_VALUE_MAX_LENGTH {
                return Err(AppError::Validation(format!(
                    "field '{}' must not exceed {FIELD_VALUE_MAX_LENGTH} characters",
                    definition.label()
                )));
            }

            if matches!(definition.kind(), FieldKind::DropdownFromColumn { .. })
                && let Some(options) = dropdown_options.get(&definition.id())
                && !options.is_empty()
                && !options.contains(value)
            {
                return Err(AppError::Validation(format!(
                    "'{value}' is not a valid option for field '{}'",
                    definition.label()
                )));
            }

            captured.insert(definition.id(), value.to_owned());
        }

        Ok(CapturedFieldValues(captured))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use crate::{FieldDefinitionId, ProjectId};

    use super::{FieldKind, ItemFieldDefinition, ItemFieldSchema};

    fn definition(label: &str, kind: FieldKind, is_grouping_key: bool) -> ItemFieldDefinition {
        ItemFieldDefinition::new(
            FieldDefinitionId::new(),
            ProjectId::new(),
            label,
            kind,
            is_grouping_key,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn schema_rejects_two_grouping_keys() {
        let result = ItemFieldSchema::new(vec![
            definition("Village", FieldKind::Text, true),
            definition("Ward", FieldKind::Text, true),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_answer_is_rejected() {
        let village = definition("Village", FieldKind::Text, true);
        let schema =
            ItemFieldSchema::new(vec![village.clone()]).unwrap_or_else(|_| unreachable!());
        let raw = BTreeMap::from([(village.id(), "   ".to_owned())]);

        assert!(schema.validate_values(&raw, &BTreeMap::new()).is_err());
    }

    #[test]
    fn blank_optional_answers_are_skipped() {
        let village = definition("Village", FieldKind::Text, true).with_required(false);
        let ward = definition("Ward", FieldKind::Text, false);
        let schema = ItemFieldSchema::new(vec![village.clone(), ward.clone()])
            .unwrap_or_else(|_| unreachable!());

        let captured = schema
            .validate_values(
                &BTreeMap::from([(village.id(), " ".to_owned()), (ward.id(), "North".to_owned())]),
                &BTreeMap::new(),
            )
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(captured.get(village.id()), None);
        assert_eq!(captured.get(ward.id()), Some("North"));
        assert!(schema.validate_values(&BTreeMap::new(), &BTreeMap::new()).is_err());
    }

    #[test]
    fn dropdown_answer_must_be_an_option() {
        let village = definition(
            "Village",
            FieldKind::DropdownFromColumn {
                column: "Village".to_owned(),
            },
            true,
        );
        let schema =
            ItemFieldSchema::new(vec![village.clone()]).unwrap_or_else(|_| unreachable!());
        let options = BTreeMap::from([(
            village.id(),
            BTreeSet::from(["Bari".to_owned(), "Dala".to_owned()]),
        )]);

        let rejected = schema.validate_values(
            &BTreeMap::from([(village.id(), "Kura".to_owned())]),
            &options,
        );
        assert!(rejected.is_err());

        let accepted = schema
            .validate_values(
                &BTreeMap::from([(village.id(), " Bari ".to_owned())]),
                &options,
            )
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(accepted.get(village.id()), Some("Bari"));
    }

    #[test]
    fn grouping_field_is_found() {
        let ward = definition("Ward", FieldKind::Text, false);
        let village = definition("Village", FieldKind::Text, true);
        let schema = ItemFieldSchema::new(vec![ward, village.clone()])
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(schema.grouping_field().map(|field| field.id()), Some(village.id()));
    }
}
