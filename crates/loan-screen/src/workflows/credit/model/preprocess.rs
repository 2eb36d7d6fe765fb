use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::features::FeatureRow;
use super::super::training::DatasetColumn;
use super::ModelError;

/// Fitted per-column transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransform {
    /// Median imputation followed by standardization.
    Numeric {
        column: String,
        median: f64,
        mean: f64,
        scale: f64,
    },
    /// Most-frequent imputation followed by one-hot encoding over sorted categories.
    Categorical {
        column: String,
        most_frequent: String,
        categories: Vec<String>,
    },
}

impl ColumnTransform {
    pub fn column(&self) -> &str {
        match self {
            ColumnTransform::Numeric { column, .. } | ColumnTransform::Categorical { column, .. } => {
                column
            }
        }
    }

    fn width(&self) -> usize {
        match self {
            ColumnTransform::Numeric { .. } => 1,
            ColumnTransform::Categorical { categories, .. } => categories.len(),
        }
    }

    fn encode_number(&self, value: Option<f64>) -> f64 {
        match self {
            ColumnTransform::Numeric {
                median,
                mean,
                scale,
                ..
            } => (value.unwrap_or(*median) - mean) / scale,
            ColumnTransform::Categorical { .. } => 0.0,
        }
    }

    /// Unknown categories leave the whole block at zero.
    fn encode_category(&self, value: Option<String>, out: &mut Vec<f64>) {
        if let ColumnTransform::Categorical {
            most_frequent,
            categories,
            ..
        } = self
        {
            let value = value.unwrap_or_else(|| most_frequent.clone());
            out.extend(
                categories
                    .iter()
                    .map(|category| if *category == value { 1.0 } else { 0.0 }),
            );
        }
    }
}

/// Column-wise preprocessing shared by every kernel's pipeline.
///
/// Output layout is every numeric column in feature order, followed by every categorical
/// one-hot block in feature order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    transforms: Vec<ColumnTransform>,
}

impl ColumnPreprocessor {
    pub fn fit(columns: &[DatasetColumn]) -> Self {
        let transforms = columns
            .iter()
            .map(|column| {
                if column.is_numeric() {
                    fit_numeric(column)
                } else {
                    fit_categorical(column)
                }
            })
            .collect();

        Self { transforms }
    }

    pub fn transforms(&self) -> &[ColumnTransform] {
        &self.transforms
    }

    pub fn columns(&self) -> Vec<String> {
        self.transforms
            .iter()
            .map(|transform| transform.column().to_string())
            .collect()
    }

    pub fn output_width(&self) -> usize {
        self.transforms.iter().map(ColumnTransform::width).sum()
    }

    pub fn transform_row(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        self.check_layout(row.columns())?;

        let values = row.values();
        Ok(self.encode(
            |index| values[index].as_number(),
            |index| values[index].as_category(),
        ))
    }

    /// Encode every row of a column-major dataset laid out like the fitted columns. Rows
    /// beyond a shorter column's length read as missing and are imputed.
    pub fn transform_dataset(&self, columns: &[DatasetColumn]) -> Result<Array2<f64>, ModelError> {
        let names: Vec<String> = columns.iter().map(|column| column.name.clone()).collect();
        self.check_layout(&names)?;

        let rows = columns.iter().map(DatasetColumn::len).max().unwrap_or(0);
        let width = self.output_width();
        let mut flat = Vec::with_capacity(rows * width);

        for row in 0..rows {
            flat.extend(self.encode(
                |index| columns[index].number_at(row),
                |index| columns[index].category_at(row),
            ));
        }

        Array2::from_shape_vec((rows, width), flat).map_err(|err| ModelError::Shape {
            rows,
            width,
            message: err.to_string(),
        })
    }

    fn check_layout(&self, columns: &[String]) -> Result<(), ModelError> {
        let matches = columns.len() == self.transforms.len()
            && columns
                .iter()
                .zip(&self.transforms)
                .all(|(name, transform)| name == transform.column());
        if matches {
            Ok(())
        } else {
            Err(ModelError::ColumnMismatch {
                expected: self.columns(),
                found: columns.to_vec(),
            })
        }
    }

    fn encode<N, C>(&self, number: N, category: C) -> Vec<f64>
    where
        N: Fn(usize) -> Option<f64>,
        C: Fn(usize) -> Option<String>,
    {
        let mut out = Vec::with_capacity(self.output_width());
        for (index, transform) in self.transforms.iter().enumerate() {
            if let ColumnTransform::Numeric { .. } = transform {
                out.push(transform.encode_number(number(index)));
            }
        }
        for (index, transform) in self.transforms.iter().enumerate() {
            if let ColumnTransform::Categorical { .. } = transform {
                transform.encode_category(category(index), &mut out);
            }
        }
        out
    }
}

fn fit_numeric(column: &DatasetColumn) -> ColumnTransform {
    let rows = column.len();
    let mut observed: Vec<f64> = (0..rows).filter_map(|row| column.number_at(row)).collect();
    observed.sort_by(f64::total_cmp);

    let median = match observed.len() {
        0 => {
            warn!(column = %column.name, "numeric column has no values; imputing 0");
            0.0
        }
        len if len % 2 == 1 => observed[len / 2],
        len => (observed[len / 2 - 1] + observed[len / 2]) / 2.0,
    };

    let imputed: Vec<f64> = (0..rows)
        .map(|row| column.number_at(row).unwrap_or(median))
        .collect();
    let count = imputed.len().max(1) as f64;
    let mean = imputed.iter().sum::<f64>() / count;
    let variance = imputed.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();
    let scale = if std_dev > f64::EPSILON { std_dev } else { 1.0 };

    ColumnTransform::Numeric {
        column: column.name.clone(),
        median,
        mean,
        scale,
    }
}

fn fit_categorical(column: &DatasetColumn) -> ColumnTransform {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in 0..column.len() {
        if let Some(value) = column.category_at(row) {
            *counts.entry(value).or_default() += 1;
        }
    }

    // BTreeMap iterates in ascending order, so ties keep the smallest category.
    let mut most_frequent = String::new();
    let mut best = 0;
    for (value, count) in &counts {
        if *count > best {
            best = *count;
            most_frequent = value.clone();
        }
    }
    if counts.is_empty() {
        warn!(column = %column.name, "categorical column has no values; encoding as empty");
    }

    ColumnTransform::Categorical {
        column: column.name.clone(),
        most_frequent,
        categories: counts.into_keys().collect(),
    }
}
