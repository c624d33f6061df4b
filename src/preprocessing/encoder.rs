//! Categorical schema and ordinal encoding
//!
//! The schema is derived once from the training frame and then frozen: the
//! encoder maps every categorical value through that fixed vocabulary and
//! rejects anything it has not seen.

use crate::error::{ForecastError, Result};
use ndarray::Array2;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed, ordered set of categories for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    categories: Vec<String>,
    codes: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from values in order of first appearance, skipping nulls
    pub fn from_values<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut categories = Vec::new();
        let mut codes = HashMap::new();

        for val in values.into_iter().flatten() {
            if !codes.contains_key(val) {
                codes.insert(val.to_string(), categories.len());
                categories.push(val.to_string());
            }
        }

        Self { categories, codes }
    }

    /// Number of encoded levels
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Integer code of a category
    pub fn code(&self, category: &str) -> Option<usize> {
        self.codes.get(category).copied()
    }
}

/// Kind of a feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical(Vocabulary),
}

/// A feature column and how it is projected to numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub dtype: ColumnType,
}

/// Frozen description of the feature columns seen at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSchema {
    columns: Vec<ColumnSpec>,
}

impl CategoricalSchema {
    /// Derive the schema from a training frame
    ///
    /// String, categorical and enum columns are categorical; their
    /// vocabulary is every non-null value observed, in order of first
    /// appearance. All other columns are numeric.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                let dtype = match column.dtype() {
                    DataType::String | DataType::Categorical(..) | DataType::Enum(..) => {
                        let values = column.cast(&DataType::String)?;
                        let ca = values.as_materialized_series().str()?;
                        ColumnType::Categorical(Vocabulary::from_values(ca.into_iter()))
                    }
                    _ => ColumnType::Numeric,
                };
                Ok(ColumnSpec {
                    name: column.name().to_string(),
                    dtype,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Feature names in matrix column order
    pub fn feature_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Matrix column indices of the categorical features
    pub fn categorical_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c.dtype, ColumnType::Categorical(_)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Categorical columns with their vocabularies
    pub fn categorical_columns(&self) -> impl Iterator<Item = (&str, &Vocabulary)> {
        self.columns.iter().filter_map(|c| match &c.dtype {
            ColumnType::Categorical(vocab) => Some((c.name.as_str(), vocab)),
            ColumnType::Numeric => None,
        })
    }

    /// Vocabulary of a categorical column
    pub fn vocabulary(&self, name: &str) -> Option<&Vocabulary> {
        self.categorical_columns()
            .find(|(col, _)| *col == name)
            .map(|(_, vocab)| vocab)
    }
}

/// Ordinal encoder projecting a frame onto the frozen schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    schema: CategoricalSchema,
}

impl OrdinalEncoder {
    pub fn new(schema: CategoricalSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &CategoricalSchema {
        &self.schema
    }

    /// Encode `df` into a row-major feature matrix
    ///
    /// Columns are looked up by name, so extra or reordered input columns are
    /// fine. Nulls become `NaN`; unseen categories are an error.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();

        let col_data: Vec<Vec<f64>> = self
            .schema
            .columns
            .par_iter()
            .map(|spec| {
                let column = df
                    .column(&spec.name)
                    .map_err(|_| ForecastError::FeatureNotFound(spec.name.clone()))?;
                match &spec.dtype {
                    ColumnType::Numeric => Self::encode_numeric(column),
                    ColumnType::Categorical(vocab) => Self::encode_categorical(&spec.name, column, vocab),
                }
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
        Ok(Array2::from_shape_fn((n_rows, col_refs.len()), |(r, c)| col_refs[c][r]))
    }

    fn encode_numeric(column: &Column) -> Result<Vec<f64>> {
        let values = column.cast(&DataType::Float64)?;
        Ok(values
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    fn encode_categorical(name: &str, column: &Column, vocab: &Vocabulary) -> Result<Vec<f64>> {
        let values = column.cast(&DataType::String)?;
        values
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| match v {
                None => Ok(f64::NAN),
                Some(category) => vocab.code(category).map(|code| code as f64).ok_or_else(|| {
                    ForecastError::UnknownCategory {
                        column: name.to_string(),
                        category: category.to_string(),
                    }
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "temperature" => &[10.0, 12.5, 11.0, 9.0],
            "weekday" => &["mon", "tue", "mon", "wed"]
        )
        .unwrap()
    }

    #[test]
    fn test_schema_detects_categorical_columns() {
        let schema = CategoricalSchema::from_frame(&frame()).unwrap();

        assert_eq!(schema.feature_names(), vec!["temperature", "weekday"]);
        assert_eq!(schema.categorical_indices(), vec![1]);

        let vocab = schema.vocabulary("weekday").unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.categories(), &["mon", "tue", "wed"]);
        assert!(schema.vocabulary("temperature").is_none());
    }

    #[test]
    fn test_encoder_preserves_rows_and_order() {
        let df = frame();
        let encoder = OrdinalEncoder::new(CategoricalSchema::from_frame(&df).unwrap());
        let x = encoder.transform(&df).unwrap();

        assert_eq!(x.dim(), (4, 2));
        assert_eq!(x.column(0).to_vec(), vec![10.0, 12.5, 11.0, 9.0]);
        assert_eq!(x.column(1).to_vec(), vec![0.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_encoder_rejects_unseen_category() {
        let encoder = OrdinalEncoder::new(CategoricalSchema::from_frame(&frame()).unwrap());
        let new = df!(
            "temperature" => &[8.0],
            "weekday" => &["sun"]
        )
        .unwrap();

        let err = encoder.transform(&new).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::UnknownCategory { ref column, ref category }
                if column == "weekday" && category == "sun"
        ));
    }

    #[test]
    fn test_encoder_missing_column() {
        let encoder = OrdinalEncoder::new(CategoricalSchema::from_frame(&frame()).unwrap());
        let new = df!("temperature" => &[8.0]).unwrap();

        assert!(matches!(
            encoder.transform(&new),
            Err(ForecastError::FeatureNotFound(ref name)) if name == "weekday"
        ));
    }

    #[test]
    fn test_categorical_dtype_is_categorical() {
        let zone = Column::new("zone".into(), &["north", "south", "north", "centre"])
            .cast(&DataType::Categorical(None, CategoricalOrdering::Physical))
            .unwrap();
        let df = DataFrame::new(vec![Column::new("t".into(), &[1.0, 2.0, 3.0, 4.0]), zone]).unwrap();

        let schema = CategoricalSchema::from_frame(&df).unwrap();
        assert_eq!(schema.categorical_indices(), vec![1]);
        assert_eq!(schema.vocabulary("zone").unwrap().categories(), &["north", "south", "centre"]);

        let x = OrdinalEncoder::new(schema).transform(&df).unwrap();
        assert_eq!(x.column(1).to_vec(), vec![0.0, 1.0, 0.0, 2.0]);

        // Plain strings at prediction time go through the same vocabulary
        let new = df!("t" => &[5.0], "zone" => &["centre"]).unwrap();
        let encoder = OrdinalEncoder::new(CategoricalSchema::from_frame(&df).unwrap());
        assert_eq!(encoder.transform(&new).unwrap().row(0).to_vec(), vec![5.0, 2.0]);
    }

    #[test]
    fn test_encoder_columns_by_name() {
        let df = frame();
        let encoder = OrdinalEncoder::new(CategoricalSchema::from_frame(&df).unwrap());
        let reordered = df!(
            "weekday" => &["wed"],
            "extra" => &[1i32],
            "temperature" => &[7.0]
        )
        .unwrap();

        let x = encoder.transform(&reordered).unwrap();
        assert_eq!(x.row(0).to_vec(), vec![7.0, 2.0]);
    }
}
