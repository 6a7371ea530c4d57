use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::warn;

use fieldtrack_core::{AppError, AppResult};
use fieldtrack_domain::{DataFile, FieldDefinitionId, ItemFieldSchema, Project};

use crate::{MediaStore, SpreadsheetAdapter};

const DATA_FILE_NAMESPACE: &str = "project_data";
const DATA_FILE_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

/// Reads the tabular data file backing dropdown fields.
///
/// Every read fails soft: a missing or unreadable file yields no headers and
/// no options.
#[derive(Clone)]
pub struct DataFileService {
    media: Arc<dyn MediaStore>,
    spreadsheet: Arc<dyn SpreadsheetAdapter>,
}

impl DataFileService {
    /// Creates a new data file service.
    #[must_use]
    pub fn new(media: Arc<dyn MediaStore>, spreadsheet: Arc<dyn SpreadsheetAdapter>) -> Self {
        Self { media, spreadsheet }
    }

    /// Stores an uploaded CSV or XLSX file.
    pub async fn store(&self, filename: &str, bytes: Vec<u8>) -> AppResult<DataFile> {
        let filename = filename.trim();
        let extension = filename
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .unwrap_or_default();
        if !DATA_FILE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::Validation(
                "data file must be a .csv or .xlsx file".to_owned(),
            ));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("data file is empty".to_owned()));
        }

        let storage_key = self.media.put(DATA_FILE_NAMESPACE, filename, bytes).await?;
        Ok(DataFile {
            storage_key,
            filename: filename.to_owned(),
        })
    }

    /// Removes a superseded data file. Failures are only logged.
    pub async fn discard(&self, project: &Project, data_file: &DataFile) {
        if let Err(error) = self.media.delete(&data_file.storage_key).await {
            warn!(
                error = %error,
                project_id = %project.id(),
                storage_key = %data_file.storage_key,
                "failed to remove replaced project data file"
            );
        }
    }

    /// Returns the header row of the project's data file.
    pub async fn headers(&self, project: &Project) -> Vec<String> {
        match self.load(project).await {
            Some((data_file, bytes)) => self.spreadsheet.headers(&bytes, &data_file.filename),
            None => Vec::new(),
        }
    }

    /// Returns the distinct values of one column of the project's data file.
    pub async fn column_values(&self, project: &Project, column: &str) -> BTreeSet<String> {
        match self.load(project).await {
            Some((data_file, bytes)) => {
                self.spreadsheet
                    .column_values(&bytes, &data_file.filename, column)
            }
            None => BTreeSet::new(),
        }
    }

    /// Returns the options of every dropdown field, loading the file once.
    pub async fn dropdown_options(
        &self,
        project: &Project,
        schema: &ItemFieldSchema,
    ) -> BTreeMap<FieldDefinitionId, BTreeSet<String>> {
        let columns = schema
            .definitions()
            .iter()
            .filter_map(|definition| {
                definition
                    .kind()
                    .column()
                    .map(|column| (definition.id(), column))
            })
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return BTreeMap::new();
        }

        let Some((data_file, bytes)) = self.load(project).await else {
            return BTreeMap::new();
        };

        columns
            .into_iter()
            .map(|(field_id, column)| {
                (
                    field_id,
                    self.spreadsheet
                        .column_values(&bytes, &data_file.filename, column),
                )
            })
            .collect()
    }

    async fn load<'a>(&self, project: &'a Project) -> Option<(&'a DataFile, Vec<u8>)> {
        let data_file = project.data_file()?;

        match self.media.get(&data_file.storage_key).await {
            Ok(Some(bytes)) => Some((data_file, bytes)),
            Ok(None) => {
                warn!(
                    project_id = %project.id(),
                    storage_key = %data_file.storage_key,
                    "project data file is missing from media storage"
                );
                None
            }
            Err(error) => {
                warn!(
                    error = %error,
                    project_id = %project.id(),
                    "failed to read project data file"
                );
                None
            }
        }
    }
}
