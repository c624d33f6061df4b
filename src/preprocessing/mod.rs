//! Data preprocessing module
//!
//! Turns a feature frame into the dense matrix the estimators consume.

mod encoder;

pub use encoder::{CategoricalSchema, ColumnSpec, ColumnType, OrdinalEncoder, Vocabulary};
