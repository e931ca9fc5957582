use std::collections::HashSet;
use std::ops::Range;

use arrow::array::Array;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use super::model::{
    column_has_missing, float_column, int_column, Collection, CASE_COLUMN, TIMEPOINT_COLUMN,
};
use super::types::CollectionType;
use crate::error::{CollectionError, Result};

// ---------------------------------------------------------------------------
// Layout validation
// ---------------------------------------------------------------------------

fn not_of_type(layout: CollectionType, reason: impl std::fmt::Display) -> CollectionError {
    CollectionError::type_error(format!(
        "Input collection is not of type {layout}: {reason}"
    ))
}

/// Check that `x` satisfies the structural rules of its layout and return
/// the layout tag.
pub fn get_type(x: &Collection) -> Result<CollectionType> {
    let layout = x.layout();
    match x {
        // Rank is fixed by the carrier.
        Collection::Numpy3D(a) => {
            if a.shape()[1] == 0 {
                return Err(not_of_type(layout, "array has no channels"));
            }
        }
        Collection::Numpy2D(_) => {}
        Collection::NpList(arrays) => {
            let Some(first) = arrays.first() else {
                return Err(not_of_type(layout, "list is empty"));
            };
            if first.nrows() == 0 {
                return Err(not_of_type(layout, "case 0 has no channels"));
            }
            if let Some(i) = arrays.iter().position(|a| a.nrows() != first.nrows()) {
                return Err(not_of_type(
                    layout,
                    format!(
                        "case {i} has {} channels, case 0 has {}",
                        arrays[i].nrows(),
                        first.nrows()
                    ),
                ));
            }
        }
        Collection::DfList(batches) => {
            let Some(first) = batches.first() else {
                return Err(not_of_type(layout, "list is empty"));
            };
            if first.num_columns() == 0 {
                return Err(not_of_type(layout, "case 0 has no channels"));
            }
            for (i, batch) in batches.iter().enumerate() {
                check_float_columns(batch, 0)
                    .map_err(|e| not_of_type(layout, format!("case {i}: {e}")))?;
                if batch.num_columns() != first.num_columns() {
                    return Err(not_of_type(
                        layout,
                        format!(
                            "case {i} has {} channels, case 0 has {}",
                            batch.num_columns(),
                            first.num_columns()
                        ),
                    ));
                }
            }
        }
        Collection::PdWide(batch) => {
            check_float_columns(batch, 0).map_err(|e| not_of_type(layout, e))?;
        }
        Collection::PdMultiIndex(batch) => {
            check_multiindex(batch).map_err(|e| not_of_type(layout, e))?;
        }
    }
    Ok(layout)
}

/// Every column from `start` on must be Float64.
fn check_float_columns(batch: &RecordBatch, start: usize) -> std::result::Result<(), String> {
    let schema = batch.schema();
    for field in &schema.fields()[start..] {
        if field.data_type() != &DataType::Float64 {
            return Err(format!(
                "column '{}' is {:?}, expected Float64",
                field.name(),
                field.data_type()
            ));
        }
    }
    Ok(())
}

fn check_multiindex(batch: &RecordBatch) -> std::result::Result<(), String> {
    let schema = batch.schema();
    for (idx, name) in [(0, CASE_COLUMN), (1, TIMEPOINT_COLUMN)] {
        let Some(field) = schema.fields().get(idx) else {
            return Err(format!("missing '{name}' column"));
        };
        if field.name() != name || field.data_type() != &DataType::Int64 {
            return Err(format!("column {idx} must be Int64 '{name}'"));
        }
        if batch.column(idx).null_count() > 0 {
            return Err(format!("'{name}' column contains nulls"));
        }
    }
    if batch.num_columns() < 3 {
        return Err("table has no channel columns".to_string());
    }
    check_float_columns(batch, 2)?;

    let blocks = case_blocks(batch).ok_or("'case' column is not Int64")?;
    let cases = int_column(batch, 0).ok_or("'case' column is not Int64")?;
    let mut seen = HashSet::with_capacity(blocks.len());
    for block in &blocks {
        let id = cases.value(block.start);
        if !seen.insert(id) {
            return Err(format!("rows of case {id} are not contiguous"));
        }
    }
    Ok(())
}

/// Row ranges of consecutive equal case ids in a `pd-multiindex` table.
pub(crate) fn case_blocks(batch: &RecordBatch) -> Option<Vec<Range<usize>>> {
    let cases = int_column(batch, 0)?;
    let mut blocks = Vec::new();
    let mut start = 0;
    for row in 1..=cases.len() {
        if row == cases.len() || cases.value(row) != cases.value(start) {
            blocks.push(start..row);
            start = row;
        }
    }
    Some(blocks)
}

// ---------------------------------------------------------------------------
// Unchecked shape helpers, for collections already accepted by `get_type`
// ---------------------------------------------------------------------------

pub(crate) fn channels_of(x: &Collection) -> usize {
    match x {
        Collection::Numpy3D(a) => a.shape()[1],
        Collection::NpList(arrays) => arrays.first().map_or(0, |a| a.nrows()),
        Collection::DfList(batches) => batches.first().map_or(0, |b| b.num_columns()),
        Collection::Numpy2D(_) | Collection::PdWide(_) => 1,
        Collection::PdMultiIndex(batch) => batch.num_columns().saturating_sub(2),
    }
}

pub(crate) fn lengths_of(x: &Collection) -> Vec<usize> {
    match x {
        Collection::Numpy3D(a) => vec![a.shape()[2]; a.shape()[0]],
        Collection::NpList(arrays) => arrays.iter().map(|a| a.ncols()).collect(),
        Collection::DfList(batches) => batches.iter().map(|b| b.num_rows()).collect(),
        Collection::Numpy2D(a) => vec![a.ncols(); a.nrows()],
        Collection::PdWide(batch) => vec![batch.num_rows(); batch.num_columns()],
        Collection::PdMultiIndex(batch) => case_blocks(batch)
            .unwrap_or_default()
            .iter()
            .map(|r| r.len())
            .collect(),
    }
}

pub(crate) fn cases_of(x: &Collection) -> usize {
    match x {
        Collection::Numpy3D(a) => a.shape()[0],
        Collection::NpList(arrays) => arrays.len(),
        Collection::DfList(batches) => batches.len(),
        Collection::Numpy2D(a) => a.nrows(),
        Collection::PdWide(batch) => batch.num_columns(),
        Collection::PdMultiIndex(batch) => case_blocks(batch).map_or(0, |b| b.len()),
    }
}

/// Fixed layouts are equal length by construction and are not scanned.
pub(crate) fn equal_length_of(x: &Collection) -> bool {
    match x.layout() {
        CollectionType::Numpy3D | CollectionType::Numpy2D | CollectionType::PdWide => true,
        CollectionType::NpList | CollectionType::DfList | CollectionType::PdMultiIndex => {
            lengths_of(x).windows(2).all(|w| w[0] == w[1])
        }
    }
}

// ---------------------------------------------------------------------------
// Shape predicates
// ---------------------------------------------------------------------------

/// Number of cases (series) in the collection.
pub fn get_n_cases(x: &Collection) -> Result<usize> {
    get_type(x)?;
    Ok(cases_of(x))
}

/// Number of channels shared by every case.
pub fn get_n_channels(x: &Collection) -> Result<usize> {
    get_type(x)?;
    Ok(channels_of(x))
}

/// Length of every case, in case order.
pub fn get_series_lengths(x: &Collection) -> Result<Vec<usize>> {
    get_type(x)?;
    Ok(lengths_of(x))
}

/// Series length of an equal-length collection.
pub fn get_n_timepoints(x: &Collection) -> Result<usize> {
    get_type(x)?;
    if !equal_length_of(x) {
        return Err(CollectionError::value_error(
            "Collection contains unequal length series, there is no single series length",
        ));
    }
    Ok(match x {
        Collection::Numpy3D(a) => a.shape()[2],
        Collection::Numpy2D(a) => a.ncols(),
        Collection::PdWide(batch) => batch.num_rows(),
        _ => lengths_of(x).first().copied().unwrap_or(0),
    })
}

/// Whether every case has a single channel.
pub fn is_univariate(x: &Collection) -> Result<bool> {
    Ok(get_n_channels(x)? == 1)
}

/// Whether `x`, which must be of layout `layout`, holds equal-length series.
///
/// Fixed layouts answer without scanning.
pub fn equal_length(x: &Collection, layout: CollectionType) -> Result<bool> {
    if x.layout() != layout {
        return Err(not_of_type(layout, format!("found {}", x.layout())));
    }
    get_type(x)?;
    Ok(equal_length_of(x))
}

/// Whether every case has the same number of time points.
pub fn is_equal_length(x: &Collection) -> Result<bool> {
    get_type(x)?;
    Ok(equal_length_of(x))
}

/// Whether any value in the collection is NaN or null.
pub fn has_missing(x: &Collection) -> Result<bool> {
    get_type(x)?;
    Ok(match x {
        Collection::Numpy3D(a) => a.iter().any(|v| v.is_nan()),
        Collection::NpList(arrays) => arrays.iter().any(|a| a.iter().any(|v| v.is_nan())),
        Collection::DfList(batches) => batches.iter().any(|b| batch_has_missing(b, 0)),
        Collection::Numpy2D(a) => a.iter().any(|v| v.is_nan()),
        Collection::PdWide(batch) => batch_has_missing(batch, 0),
        Collection::PdMultiIndex(batch) => batch_has_missing(batch, 2),
    })
}

fn batch_has_missing(batch: &RecordBatch, start: usize) -> bool {
    (start..batch.num_columns())
        .filter_map(|idx| float_column(batch, idx))
        .any(column_has_missing)
}
