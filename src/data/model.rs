use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use ndarray::{Array2, Array3, ArrayD, Ix2, Ix3};

use super::types::CollectionType;
use crate::error::{CollectionError, Result};

/// Name of the case-key column of a `pd-multiindex` table.
pub const CASE_COLUMN: &str = "case";
/// Name of the time-key column of a `pd-multiindex` table.
pub const TIMEPOINT_COLUMN: &str = "timepoint";

// ---------------------------------------------------------------------------
// Collection – one layout's data
// ---------------------------------------------------------------------------

/// A collection of time series held in one of the recognized layouts.
///
/// The variant only says which container holds the data. Whether the
/// container actually satisfies the layout's rules (consistent channel
/// counts, Float64 columns, contiguous case blocks) is checked by
/// [`get_type`](super::validation::get_type).
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    /// (n_cases, n_channels, n_timepoints)
    Numpy3D(Array3<f64>),
    /// One (n_channels, n_timepoints) array per case.
    NpList(Vec<Array2<f64>>),
    /// One table per case: rows are time points, Float64 columns are channels.
    DfList(Vec<RecordBatch>),
    /// (n_cases, n_timepoints)
    Numpy2D(Array2<f64>),
    /// Rows are time points, one Float64 column per case.
    PdWide(RecordBatch),
    /// Long table: `case`, `timepoint`, then one Float64 column per channel.
    PdMultiIndex(RecordBatch),
}

impl Collection {
    /// Classify a dynamic-rank array: rank 3 is `numpy3D`, rank 2 is `numpy2D`.
    pub fn from_array(array: ArrayD<f64>) -> Result<Self> {
        match array.ndim() {
            3 => Ok(Collection::Numpy3D(array.into_dimensionality::<Ix3>()?)),
            2 => Ok(Collection::Numpy2D(array.into_dimensionality::<Ix2>()?)),
            n => Err(CollectionError::type_error(format!(
                "Input array of dimension {n} is not of type numpy3D or numpy2D"
            ))),
        }
    }

    /// The layout tag implied by the variant, without validating contents.
    pub fn layout(&self) -> CollectionType {
        match self {
            Collection::Numpy3D(_) => CollectionType::Numpy3D,
            Collection::NpList(_) => CollectionType::NpList,
            Collection::DfList(_) => CollectionType::DfList,
            Collection::Numpy2D(_) => CollectionType::Numpy2D,
            Collection::PdWide(_) => CollectionType::PdWide,
            Collection::PdMultiIndex(_) => CollectionType::PdMultiIndex,
        }
    }
}

impl From<Array3<f64>> for Collection {
    fn from(x: Array3<f64>) -> Self {
        Collection::Numpy3D(x)
    }
}

impl From<Array2<f64>> for Collection {
    fn from(x: Array2<f64>) -> Self {
        Collection::Numpy2D(x)
    }
}

impl From<Vec<Array2<f64>>> for Collection {
    fn from(x: Vec<Array2<f64>>) -> Self {
        Collection::NpList(x)
    }
}

impl From<Vec<RecordBatch>> for Collection {
    fn from(x: Vec<RecordBatch>) -> Self {
        Collection::DfList(x)
    }
}

// ---------------------------------------------------------------------------
// Arrow helpers shared by validation and conversion
// ---------------------------------------------------------------------------

pub fn channel_name(channel: usize) -> String {
    format!("channel_{channel}")
}

pub fn case_name(case: usize) -> String {
    format!("case_{case}")
}

/// Schema of `n` nullable Float64 columns named by `name`.
pub(crate) fn float_schema(n: usize, name: impl Fn(usize) -> String) -> SchemaRef {
    let fields: Vec<Field> = (0..n)
        .map(|i| Field::new(name(i), DataType::Float64, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Schema of a `pd-multiindex` table with `n_channels` value columns.
pub(crate) fn multiindex_schema(n_channels: usize) -> SchemaRef {
    let mut fields = vec![
        Field::new(CASE_COLUMN, DataType::Int64, false),
        Field::new(TIMEPOINT_COLUMN, DataType::Int64, false),
    ];
    fields.extend((0..n_channels).map(|c| Field::new(channel_name(c), DataType::Float64, true)));
    Arc::new(Schema::new(fields))
}

pub(crate) fn float_array(values: Vec<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

pub(crate) fn int_array(values: Vec<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(values))
}

/// Downcast column `idx` of `batch` to Float64.
pub(crate) fn float_column(batch: &RecordBatch, idx: usize) -> Option<&Float64Array> {
    batch.column(idx).as_any().downcast_ref::<Float64Array>()
}

/// Downcast column `idx` of `batch` to Int64.
pub(crate) fn int_column(batch: &RecordBatch, idx: usize) -> Option<&Int64Array> {
    batch.column(idx).as_any().downcast_ref::<Int64Array>()
}

/// Values of a Float64 column with nulls read as NaN.
pub(crate) fn float_values(col: &Float64Array) -> impl Iterator<Item = f64> + '_ {
    col.iter().map(|v| v.unwrap_or(f64::NAN))
}

/// Whether a Float64 column holds a null or a NaN.
pub(crate) fn column_has_missing(col: &Float64Array) -> bool {
    col.null_count() > 0 || col.values().iter().any(|v| v.is_nan())
}
