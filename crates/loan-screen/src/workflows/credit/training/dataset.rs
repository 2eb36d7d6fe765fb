use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::super::features::FeatureOrder;
use super::super::model::LoanLabel;

/// Cells treated as missing, matching the usual NA spellings of CSV exports.
const MISSING_TOKENS: [&str; 9] = ["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None"];

/// Names of the bookkeeping columns in the historical loan export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSchema {
    pub id_column: String,
    pub label_column: String,
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self {
            id_column: "Loan_ID".to_string(),
            label_column: "Loan_Status".to_string(),
        }
    }
}

/// Column-major storage for one feature, typed by inference over its cells.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetColumn {
    pub name: String,
    pub values: ColumnValues,
}

impl DatasetColumn {
    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn number_at(&self, row: usize) -> Option<f64> {
        match &self.values {
            ColumnValues::Numeric(values) => values.get(row).copied().flatten(),
            ColumnValues::Categorical(values) => values
                .get(row)
                .and_then(|value| value.as_deref())
                .and_then(|raw| raw.parse::<f64>().ok()),
        }
    }

    pub(crate) fn category_at(&self, row: usize) -> Option<String> {
        match &self.values {
            ColumnValues::Numeric(values) => values
                .get(row)
                .copied()
                .flatten()
                .map(|value| value.to_string()),
            ColumnValues::Categorical(values) => values.get(row).cloned().flatten(),
        }
    }
}

/// Labeled feature matrix read from a historical loan export.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    columns: Vec<DatasetColumn>,
    labels: Vec<LoanLabel>,
}

impl TrainingSet {
    pub fn from_path(path: impl AsRef<Path>, schema: &DatasetSchema) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file, schema)
    }

    pub fn from_reader<R: Read>(reader: R, schema: &DatasetSchema) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let locate = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let id_index = locate(&schema.id_column)?;
        let label_index = locate(&schema.label_column)?;

        let feature_indices: Vec<usize> = (0..headers.len())
            .filter(|index| *index != id_index && *index != label_index)
            .collect();
        if feature_indices.is_empty() {
            return Err(DatasetError::NoFeatures);
        }

        let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); feature_indices.len()];
        let mut labels = Vec::new();

        for (row_index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|position| position.line())
                .unwrap_or(row_index as u64 + 2);

            let label = match record.get(label_index).and_then(parse_cell) {
                Some(raw) => match parse_label(&raw) {
                    Some(label) => label,
                    None => return Err(DatasetError::UnknownLabel { line, value: raw }),
                },
                None => return Err(DatasetError::MissingLabel { line }),
            };
            labels.push(label);

            for (column, index) in raw_columns.iter_mut().zip(&feature_indices) {
                column.push(record.get(*index).and_then(parse_cell));
            }
        }

        if labels.is_empty() {
            return Err(DatasetError::Empty);
        }
        if let Some(only) = single_class(&labels) {
            return Err(DatasetError::SingleClass(only));
        }

        let columns = feature_indices
            .iter()
            .zip(raw_columns)
            .map(|(index, cells)| DatasetColumn {
                name: headers[*index].to_string(),
                values: infer_column(cells),
            })
            .collect();

        Ok(Self { columns, labels })
    }

    pub fn columns(&self) -> &[DatasetColumn] {
        &self.columns
    }

    pub fn labels(&self) -> &[LoanLabel] {
        &self.labels
    }

    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    pub fn feature_order(&self) -> FeatureOrder {
        FeatureOrder::new(self.columns.iter().map(|column| column.name.clone()).collect())
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.is_numeric())
            .map(|column| column.name.clone())
            .collect()
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| !column.is_numeric())
            .map(|column| column.name.clone())
            .collect()
    }
}

fn parse_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_label(raw: &str) -> Option<LoanLabel> {
    match raw.to_ascii_uppercase().as_str() {
        "Y" => Some(LoanLabel::Approve),
        "N" => Some(LoanLabel::Reject),
        _ => None,
    }
}

fn single_class(labels: &[LoanLabel]) -> Option<LoanLabel> {
    let first = *labels.first()?;
    labels
        .iter()
        .all(|label| *label == first)
        .then_some(first)
}

/// A column is numeric when every present cell parses as a number.
fn infer_column(cells: Vec<Option<String>>) -> ColumnValues {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            Some(raw) => raw.parse::<f64>().ok().map(Some),
            None => Some(None),
        })
        .collect();

    match parsed {
        Some(numbers) => ColumnValues::Numeric(numbers),
        None => ColumnValues::Categorical(cells),
    }
}

/// Failure raised while reading the training export.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),
    #[error("dataset has no feature columns besides the id and label")]
    NoFeatures,
    #[error("dataset line {line} has no label")]
    MissingLabel { line: u64 },
    #[error("dataset line {line} has unknown label '{value}' (expected Y or N)")]
    UnknownLabel { line: u64, value: String },
    #[error("dataset contains no rows")]
    Empty,
    #[error("dataset only contains {0:?} labels; both classes are required")]
    SingleClass(LoanLabel),
}
