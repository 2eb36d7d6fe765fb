//! Named feature records and the persisted column order they are projected into.
//!
//! A trained pipeline only understands rows laid out exactly like its training matrix. The
//! record built from an applicant is keyed by column name; [`FeatureRecord::project`] turns
//! it into a positional [`FeatureRow`] and refuses to guess when names do not line up.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::ApplicantRecord;
use super::evaluation::ApplicantDefaults;

pub const GENDER: &str = "Gender";
pub const MARRIED: &str = "Married";
pub const DEPENDENTS: &str = "Dependents";
pub const EDUCATION: &str = "Education";
pub const SELF_EMPLOYED: &str = "Self_Employed";
pub const APPLICANT_INCOME: &str = "ApplicantIncome";
pub const COAPPLICANT_INCOME: &str = "CoapplicantIncome";
pub const LOAN_AMOUNT: &str = "LoanAmount";
pub const LOAN_AMOUNT_TERM: &str = "Loan_Amount_Term";
pub const CREDIT_HISTORY: &str = "Credit_History";
pub const PROPERTY_AREA: &str = "Property_Area";

/// Single cell of a feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FeatureValue {
    pub fn text(value: impl Into<String>) -> Self {
        FeatureValue::Text(value.into())
    }

    /// Numeric view of the cell; text that does not parse and NaN count as missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) if !value.is_nan() => Some(*value),
            FeatureValue::Text(raw) => raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// Categorical view of the cell.
    pub fn as_category(&self) -> Option<String> {
        match self {
            FeatureValue::Text(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
            FeatureValue::Number(value) if !value.is_nan() => Some(value.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(value) => write!(f, "{value}"),
            FeatureValue::Text(value) => f.write_str(value),
            FeatureValue::Missing => f.write_str("<missing>"),
        }
    }
}

/// Ordered column names of the training feature matrix, before preprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureOrder(Vec<String>);

impl FeatureOrder {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Positional row laid out in a feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }
}

/// Mismatch between a named record and the persisted feature order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("feature order expects column '{0}' which the record does not provide")]
    MissingColumn(String),
    #[error("record column '{0}' is not part of the feature order")]
    UnexpectedColumn(String),
    #[error("feature order lists column '{0}' more than once")]
    DuplicateColumn(String),
}

/// Named single-row record assembled from an applicant plus the default policy.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    fields: Vec<(String, FeatureValue)>,
}

impl FeatureRecord {
    pub fn from_applicant(applicant: &ApplicantRecord, defaults: &ApplicantDefaults) -> Self {
        let fields = vec![
            (GENDER, FeatureValue::text(&defaults.gender)),
            (MARRIED, FeatureValue::text(&defaults.married)),
            (DEPENDENTS, FeatureValue::text(&defaults.dependents)),
            (EDUCATION, FeatureValue::text(&defaults.education)),
            (
                SELF_EMPLOYED,
                FeatureValue::text(applicant.employment.self_employed_flag()),
            ),
            (
                APPLICANT_INCOME,
                FeatureValue::Number(applicant.monthly_income),
            ),
            (
                COAPPLICANT_INCOME,
                FeatureValue::Number(defaults.coapplicant_income),
            ),
            (LOAN_AMOUNT, FeatureValue::Number(applicant.loan_amount)),
            (
                LOAN_AMOUNT_TERM,
                FeatureValue::Number(defaults.loan_amount_term),
            ),
            (
                CREDIT_HISTORY,
                FeatureValue::Number(applicant.credit_history.feature_value()),
            ),
            (
                PROPERTY_AREA,
                FeatureValue::text(applicant.property_area.label()),
            ),
        ];

        Self {
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    pub fn from_fields(fields: Vec<(String, FeatureValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Lay the record out in `order`. Every ordered column must be present and every record
    /// column must be ordered.
    pub fn project(&self, order: &FeatureOrder) -> Result<FeatureRow, SchemaError> {
        let mut seen = BTreeSet::new();
        let mut values = Vec::with_capacity(order.len());

        for column in order.columns() {
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
            let value = self
                .get(column)
                .ok_or_else(|| SchemaError::MissingColumn(column.clone()))?;
            values.push(value.clone());
        }

        if let Some((extra, _)) = self
            .fields
            .iter()
            .find(|(name, _)| !seen.contains(name.as_str()))
        {
            return Err(SchemaError::UnexpectedColumn(extra.clone()));
        }

        Ok(FeatureRow {
            columns: order.columns().to_vec(),
            values,
        })
    }
}
