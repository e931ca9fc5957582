use std::borrow::Cow;
use std::ops::Range;

use arrow::array::ArrayRef;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use ndarray::{stack, Array2, Array3, ArrayView2, Axis};

use super::model::{
    case_name, channel_name, float_array, float_column, float_schema, float_values, int_array,
    multiindex_schema, Collection,
};
use super::types::CollectionType;
use super::validation::{case_blocks, cases_of, channels_of, equal_length_of, get_type};
use crate::error::{CollectionError, Result};

/// Signature shared by every pairwise converter.
pub type Converter = fn(&Collection) -> Result<Collection>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Convert `x` into the `output_type` layout.
///
/// Returns `x` itself, borrowed, when it is already in that layout. A
/// multivariate collection cannot go to a univariate-only layout, an
/// unequal-length one cannot go to a fixed layout, and an empty one cannot go
/// to a list layout; all are reported before any conversion work starts.
pub fn convert_collection(x: &Collection, output_type: CollectionType) -> Result<Cow<'_, Collection>> {
    let input_type = get_type(x)?;
    let Some(converter) = unchecked_converter_for(input_type, output_type) else {
        log::trace!("collection already of type {output_type}");
        return Ok(Cow::Borrowed(x));
    };

    // `x` is validated once above; the shape helpers and converter trust it.
    if !output_type.supports_multivariate() && channels_of(x) != 1 {
        return Err(multivariate_error(output_type));
    }
    if !output_type.supports_unequal_length() && !equal_length_of(x) {
        return Err(unequal_error(output_type));
    }
    if is_list_layout(output_type) && cases_of(x) == 0 {
        return Err(empty_error(output_type));
    }

    log::debug!("converting collection from {input_type} to {output_type}");
    converter(x).map(Cow::Owned)
}

/// Convert `x` into the layout named `output_type`, e.g. `"np-list"`.
pub fn convert_collection_to<'a>(x: &'a Collection, output_type: &str) -> Result<Cow<'a, Collection>> {
    convert_collection(x, output_type.parse()?)
}

// ---------------------------------------------------------------------------
// Converter table
// ---------------------------------------------------------------------------

/// Declares the public converters, each validating its input before running
/// the unchecked body of the same name, and both lookup tables.
macro_rules! converters {
    ($(($from:ident, $to:ident) => $name:ident,)*) => {
        $(
            #[doc = concat!("Convert a `", stringify!($from), "` collection to `", stringify!($to), "`.")]
            pub fn $name(x: &Collection) -> Result<Collection> {
                // A different variant gets its own message from the accessor.
                if x.layout() == CollectionType::$from {
                    get_type(x)?;
                }
                unchecked::$name(x)
            }
        )*

        /// The converter for a pair of layouts, `None` when they are the same.
        pub fn converter_for(from: CollectionType, to: CollectionType) -> Option<Converter> {
            match (from, to) {
                (CollectionType::Numpy3D, CollectionType::Numpy3D)
                | (CollectionType::NpList, CollectionType::NpList)
                | (CollectionType::DfList, CollectionType::DfList)
                | (CollectionType::Numpy2D, CollectionType::Numpy2D)
                | (CollectionType::PdWide, CollectionType::PdWide)
                | (CollectionType::PdMultiIndex, CollectionType::PdMultiIndex) => None,
                $((CollectionType::$from, CollectionType::$to) => Some($name as Converter),)*
            }
        }

        /// Same table, for input `convert_collection` has already validated.
        fn unchecked_converter_for(from: CollectionType, to: CollectionType) -> Option<Converter> {
            match (from, to) {
                (CollectionType::Numpy3D, CollectionType::Numpy3D)
                | (CollectionType::NpList, CollectionType::NpList)
                | (CollectionType::DfList, CollectionType::DfList)
                | (CollectionType::Numpy2D, CollectionType::Numpy2D)
                | (CollectionType::PdWide, CollectionType::PdWide)
                | (CollectionType::PdMultiIndex, CollectionType::PdMultiIndex) => None,
                $((CollectionType::$from, CollectionType::$to) => Some(unchecked::$name as Converter),)*
            }
        }
    };
}

converters! {
    (Numpy3D, NpList) => from_numpy3d_to_np_list,
    (Numpy3D, DfList) => from_numpy3d_to_df_list,
    (Numpy3D, Numpy2D) => from_numpy3d_to_numpy2d,
    (Numpy3D, PdWide) => from_numpy3d_to_pd_wide,
    (Numpy3D, PdMultiIndex) => from_numpy3d_to_pd_multiindex,

    (NpList, Numpy3D) => from_np_list_to_numpy3d,
    (NpList, DfList) => from_np_list_to_df_list,
    (NpList, Numpy2D) => from_np_list_to_numpy2d,
    (NpList, PdWide) => from_np_list_to_pd_wide,
    (NpList, PdMultiIndex) => from_np_list_to_pd_multiindex,

    (DfList, Numpy3D) => from_df_list_to_numpy3d,
    (DfList, NpList) => from_df_list_to_np_list,
    (DfList, Numpy2D) => from_df_list_to_numpy2d,
    (DfList, PdWide) => from_df_list_to_pd_wide,
    (DfList, PdMultiIndex) => from_df_list_to_pd_multiindex,

    (Numpy2D, Numpy3D) => from_numpy2d_to_numpy3d,
    (Numpy2D, NpList) => from_numpy2d_to_np_list,
    (Numpy2D, DfList) => from_numpy2d_to_df_list,
    (Numpy2D, PdWide) => from_numpy2d_to_pd_wide,
    (Numpy2D, PdMultiIndex) => from_numpy2d_to_pd_multiindex,

    (PdWide, Numpy3D) => from_pd_wide_to_numpy3d,
    (PdWide, NpList) => from_pd_wide_to_np_list,
    (PdWide, DfList) => from_pd_wide_to_df_list,
    (PdWide, Numpy2D) => from_pd_wide_to_numpy2d,
    (PdWide, PdMultiIndex) => from_pd_wide_to_pd_multiindex,

    (PdMultiIndex, Numpy3D) => from_pd_multiindex_to_numpy3d,
    (PdMultiIndex, NpList) => from_pd_multiindex_to_np_list,
    (PdMultiIndex, DfList) => from_pd_multiindex_to_df_list,
    (PdMultiIndex, Numpy2D) => from_pd_multiindex_to_numpy2d,
    (PdMultiIndex, PdWide) => from_pd_multiindex_to_pd_wide,
}

// ---------------------------------------------------------------------------
// Source accessors: check the variant only
// ---------------------------------------------------------------------------

fn numpy3d(x: &Collection) -> Result<&Array3<f64>> {
    match x {
        Collection::Numpy3D(a) => Ok(a),
        _ => Err(CollectionError::type_error("Input should be 3-dimensional NumPy array")),
    }
}

fn numpy2d(x: &Collection) -> Result<&Array2<f64>> {
    match x {
        Collection::Numpy2D(a) => Ok(a),
        _ => Err(CollectionError::type_error("Input numpy not of type numpy2D")),
    }
}

fn np_list(x: &Collection) -> Result<&[Array2<f64>]> {
    match x {
        Collection::NpList(arrays) => Ok(arrays),
        _ => Err(CollectionError::type_error(
            "Input should be a list of 2-dimensional arrays (np-list)",
        )),
    }
}

fn df_list(x: &Collection) -> Result<&[RecordBatch]> {
    match x {
        Collection::DfList(batches) => Ok(batches),
        _ => Err(CollectionError::type_error("Input should be a list of tables (df-list)")),
    }
}

fn pd_wide(x: &Collection) -> Result<&RecordBatch> {
    match x {
        Collection::PdWide(batch) => Ok(batch),
        _ => Err(CollectionError::type_error("Input should be a wide table (pd-wide)")),
    }
}

fn pd_multiindex(x: &Collection) -> Result<&RecordBatch> {
    match x {
        Collection::PdMultiIndex(batch) => Ok(batch),
        _ => Err(CollectionError::type_error(
            "Input should be a multi-indexed long table (pd-multiindex)",
        )),
    }
}

// ---------------------------------------------------------------------------
// Container primitives
// ---------------------------------------------------------------------------

fn multivariate_error(target: CollectionType) -> CollectionError {
    CollectionError::type_error(format!("Cannot convert multivariate series to {target}"))
}

fn unequal_error(target: CollectionType) -> CollectionError {
    CollectionError::type_error(format!("Cannot convert unequal length series to {target}"))
}

fn empty_error(target: CollectionType) -> CollectionError {
    CollectionError::type_error(format!("Cannot convert an empty collection to {target}"))
}

/// List layouts take their channel count from the first case.
fn is_list_layout(layout: CollectionType) -> bool {
    matches!(layout, CollectionType::NpList | CollectionType::DfList)
}

fn non_empty<T>(cases: Vec<T>, target: CollectionType) -> Result<Vec<T>> {
    if cases.is_empty() {
        return Err(empty_error(target));
    }
    Ok(cases)
}

fn array3_to_list(a: &Array3<f64>) -> Vec<Array2<f64>> {
    a.outer_iter().map(|case| case.to_owned()).collect()
}

fn list_to_array3(list: &[Array2<f64>], target: CollectionType) -> Result<Array3<f64>> {
    if list.windows(2).any(|w| w[0].dim() != w[1].dim()) {
        return Err(unequal_error(target));
    }
    let views: Vec<ArrayView2<'_, f64>> = list.iter().map(|a| a.view()).collect();
    Ok(stack(Axis(0), &views)?)
}

fn array3_to_array2(a: &Array3<f64>, target: CollectionType) -> Result<Array2<f64>> {
    if a.shape()[1] != 1 {
        return Err(multivariate_error(target));
    }
    Ok(a.index_axis(Axis(1), 0).to_owned())
}

fn array2_to_array3(a: &Array2<f64>) -> Array3<f64> {
    a.clone().insert_axis(Axis(1))
}

fn array2_to_list(a: &Array2<f64>) -> Vec<Array2<f64>> {
    a.outer_iter()
        .map(|row| row.to_owned().insert_axis(Axis(0)))
        .collect()
}

fn list_to_array2(list: &[Array2<f64>], target: CollectionType) -> Result<Array2<f64>> {
    if list.iter().any(|a| a.nrows() != 1) {
        return Err(multivariate_error(target));
    }
    array3_to_array2(&list_to_array3(list, target)?, target)
}

/// One case as a table of `n_timepoints` rows by `n_channels` columns.
fn case_to_batch(case: &Array2<f64>) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = case
        .outer_iter()
        .map(|channel| float_array(channel.to_vec()))
        .collect();
    let schema = float_schema(columns.len(), channel_name);
    let options = RecordBatchOptions::new().with_row_count(Some(case.ncols()));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

/// Float64 columns from `start` on, restricted to `rows`, one array row per column.
fn columns_to_array2(batch: &RecordBatch, start: usize, rows: Range<usize>) -> Result<Array2<f64>> {
    let n_columns = batch.num_columns() - start;
    let mut values = Vec::with_capacity(n_columns * rows.len());
    for idx in start..batch.num_columns() {
        let col = float_column(batch, idx).ok_or_else(|| {
            CollectionError::type_error(format!("column {idx} is not Float64"))
        })?;
        let part = col.slice(rows.start, rows.len());
        values.extend(float_values(&part));
    }
    Ok(Array2::from_shape_vec((n_columns, rows.len()), values)?)
}

fn batch_to_case(batch: &RecordBatch) -> Result<Array2<f64>> {
    columns_to_array2(batch, 0, 0..batch.num_rows())
}

/// (n_cases, n_timepoints) as a table with one column per case.
fn array2_to_wide(a: &Array2<f64>) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = a
        .outer_iter()
        .map(|case| float_array(case.to_vec()))
        .collect();
    let schema = float_schema(columns.len(), case_name);
    let options = RecordBatchOptions::new().with_row_count(Some(a.ncols()));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

fn wide_to_array2(batch: &RecordBatch) -> Result<Array2<f64>> {
    columns_to_array2(batch, 0, 0..batch.num_rows())
}

fn list_to_multiindex(list: &[Array2<f64>], n_channels: usize) -> Result<RecordBatch> {
    let n_rows: usize = list.iter().map(|a| a.ncols()).sum();
    let mut cases = Vec::with_capacity(n_rows);
    let mut times = Vec::with_capacity(n_rows);
    let mut channels = vec![Vec::with_capacity(n_rows); n_channels];

    for (i, case) in list.iter().enumerate() {
        cases.extend(std::iter::repeat(i as i64).take(case.ncols()));
        times.extend(0..case.ncols() as i64);
        for (values, row) in channels.iter_mut().zip(case.outer_iter()) {
            values.extend(row.iter().copied());
        }
    }

    let mut columns = vec![int_array(cases), int_array(times)];
    columns.extend(channels.into_iter().map(float_array));
    Ok(RecordBatch::try_new(multiindex_schema(n_channels), columns)?)
}

/// Row order inside a case block is the time order; the `timepoint` values
/// themselves are not reinterpreted.
fn multiindex_to_list(batch: &RecordBatch) -> Result<Vec<Array2<f64>>> {
    let blocks = case_blocks(batch).ok_or_else(|| {
        CollectionError::type_error("Input collection is not of type pd-multiindex")
    })?;
    blocks
        .into_iter()
        .map(|rows| columns_to_array2(batch, 2, rows))
        .collect()
}

// ---------------------------------------------------------------------------
// Converter bodies, trusting the input to satisfy its layout's rules
// ---------------------------------------------------------------------------

mod unchecked {
    use super::*;

    // -----------------------------------------------------------------------
    // numpy3D →
    // -----------------------------------------------------------------------

    pub(super) fn from_numpy3d_to_np_list(x: &Collection) -> Result<Collection> {
        let list = non_empty(array3_to_list(numpy3d(x)?), CollectionType::NpList)?;
        Ok(Collection::NpList(list))
    }

    pub(super) fn from_numpy3d_to_df_list(x: &Collection) -> Result<Collection> {
        let batches = numpy3d(x)?
            .outer_iter()
            .map(|case| case_to_batch(&case.to_owned()))
            .collect::<Result<_>>()?;
        Ok(Collection::DfList(non_empty(batches, CollectionType::DfList)?))
    }

    pub(super) fn from_numpy3d_to_numpy2d(x: &Collection) -> Result<Collection> {
        let a = numpy3d(x)?;
        Ok(Collection::Numpy2D(array3_to_array2(a, CollectionType::Numpy2D)?))
    }

    pub(super) fn from_numpy3d_to_pd_wide(x: &Collection) -> Result<Collection> {
        let a = array3_to_array2(numpy3d(x)?, CollectionType::PdWide)?;
        Ok(Collection::PdWide(array2_to_wide(&a)?))
    }

    pub(super) fn from_numpy3d_to_pd_multiindex(x: &Collection) -> Result<Collection> {
        let a = numpy3d(x)?;
        let batch = list_to_multiindex(&array3_to_list(a), a.shape()[1])?;
        Ok(Collection::PdMultiIndex(batch))
    }

    // -----------------------------------------------------------------------
    // np-list →
    // -----------------------------------------------------------------------

    pub(super) fn from_np_list_to_numpy3d(x: &Collection) -> Result<Collection> {
        Ok(Collection::Numpy3D(list_to_array3(np_list(x)?, CollectionType::Numpy3D)?))
    }

    pub(super) fn from_np_list_to_df_list(x: &Collection) -> Result<Collection> {
        let batches = np_list(x)?.iter().map(case_to_batch).collect::<Result<_>>()?;
        Ok(Collection::DfList(batches))
    }

    pub(super) fn from_np_list_to_numpy2d(x: &Collection) -> Result<Collection> {
        Ok(Collection::Numpy2D(list_to_array2(np_list(x)?, CollectionType::Numpy2D)?))
    }

    pub(super) fn from_np_list_to_pd_wide(x: &Collection) -> Result<Collection> {
        let a = list_to_array2(np_list(x)?, CollectionType::PdWide)?;
        Ok(Collection::PdWide(array2_to_wide(&a)?))
    }

    pub(super) fn from_np_list_to_pd_multiindex(x: &Collection) -> Result<Collection> {
        let list = np_list(x)?;
        Ok(Collection::PdMultiIndex(list_to_multiindex(list, list[0].nrows())?))
    }

    // -----------------------------------------------------------------------
    // df-list →
    // -----------------------------------------------------------------------

    fn df_list_cases(x: &Collection) -> Result<Vec<Array2<f64>>> {
        df_list(x)?.iter().map(batch_to_case).collect()
    }

    pub(super) fn from_df_list_to_numpy3d(x: &Collection) -> Result<Collection> {
        let list = df_list_cases(x)?;
        Ok(Collection::Numpy3D(list_to_array3(&list, CollectionType::Numpy3D)?))
    }

    pub(super) fn from_df_list_to_np_list(x: &Collection) -> Result<Collection> {
        Ok(Collection::NpList(df_list_cases(x)?))
    }

    pub(super) fn from_df_list_to_numpy2d(x: &Collection) -> Result<Collection> {
        let list = df_list_cases(x)?;
        Ok(Collection::Numpy2D(list_to_array2(&list, CollectionType::Numpy2D)?))
    }

    pub(super) fn from_df_list_to_pd_wide(x: &Collection) -> Result<Collection> {
        let a = list_to_array2(&df_list_cases(x)?, CollectionType::PdWide)?;
        Ok(Collection::PdWide(array2_to_wide(&a)?))
    }

    pub(super) fn from_df_list_to_pd_multiindex(x: &Collection) -> Result<Collection> {
        let list = df_list_cases(x)?;
        let n_channels = list[0].nrows();
        Ok(Collection::PdMultiIndex(list_to_multiindex(&list, n_channels)?))
    }

    // -----------------------------------------------------------------------
    // numpy2D →
    // -----------------------------------------------------------------------

    pub(super) fn from_numpy2d_to_numpy3d(x: &Collection) -> Result<Collection> {
        Ok(Collection::Numpy3D(array2_to_array3(numpy2d(x)?)))
    }

    pub(super) fn from_numpy2d_to_np_list(x: &Collection) -> Result<Collection> {
        let list = non_empty(array2_to_list(numpy2d(x)?), CollectionType::NpList)?;
        Ok(Collection::NpList(list))
    }

    pub(super) fn from_numpy2d_to_df_list(x: &Collection) -> Result<Collection> {
        let list = non_empty(array2_to_list(numpy2d(x)?), CollectionType::DfList)?;
        let batches = list.iter().map(case_to_batch).collect::<Result<_>>()?;
        Ok(Collection::DfList(batches))
    }

    pub(super) fn from_numpy2d_to_pd_wide(x: &Collection) -> Result<Collection> {
        Ok(Collection::PdWide(array2_to_wide(numpy2d(x)?)?))
    }

    pub(super) fn from_numpy2d_to_pd_multiindex(x: &Collection) -> Result<Collection> {
        let list = array2_to_list(numpy2d(x)?);
        Ok(Collection::PdMultiIndex(list_to_multiindex(&list, 1)?))
    }

    // -----------------------------------------------------------------------
    // pd-wide →
    // -----------------------------------------------------------------------

    pub(super) fn from_pd_wide_to_numpy3d(x: &Collection) -> Result<Collection> {
        let a = wide_to_array2(pd_wide(x)?)?;
        Ok(Collection::Numpy3D(array2_to_array3(&a)))
    }

    pub(super) fn from_pd_wide_to_np_list(x: &Collection) -> Result<Collection> {
        let a = wide_to_array2(pd_wide(x)?)?;
        Ok(Collection::NpList(non_empty(array2_to_list(&a), CollectionType::NpList)?))
    }

    pub(super) fn from_pd_wide_to_df_list(x: &Collection) -> Result<Collection> {
        let a = wide_to_array2(pd_wide(x)?)?;
        let batches = non_empty(array2_to_list(&a), CollectionType::DfList)?
            .iter()
            .map(case_to_batch)
            .collect::<Result<_>>()?;
        Ok(Collection::DfList(batches))
    }

    pub(super) fn from_pd_wide_to_numpy2d(x: &Collection) -> Result<Collection> {
        Ok(Collection::Numpy2D(wide_to_array2(pd_wide(x)?)?))
    }

    pub(super) fn from_pd_wide_to_pd_multiindex(x: &Collection) -> Result<Collection> {
        let list = array2_to_list(&wide_to_array2(pd_wide(x)?)?);
        Ok(Collection::PdMultiIndex(list_to_multiindex(&list, 1)?))
    }

    // -----------------------------------------------------------------------
    // pd-multiindex →
    // -----------------------------------------------------------------------

    pub(super) fn from_pd_multiindex_to_numpy3d(x: &Collection) -> Result<Collection> {
        let batch = pd_multiindex(x)?;
        let list = multiindex_to_list(batch)?;
        if list.is_empty() {
            let n_channels = batch.num_columns() - 2;
            return Ok(Collection::Numpy3D(Array3::zeros((0, n_channels, 0))));
        }
        Ok(Collection::Numpy3D(list_to_array3(&list, CollectionType::Numpy3D)?))
    }

    pub(super) fn from_pd_multiindex_to_np_list(x: &Collection) -> Result<Collection> {
        let list = multiindex_to_list(pd_multiindex(x)?)?;
        Ok(Collection::NpList(non_empty(list, CollectionType::NpList)?))
    }

    pub(super) fn from_pd_multiindex_to_df_list(x: &Collection) -> Result<Collection> {
        let list = multiindex_to_list(pd_multiindex(x)?)?;
        let batches = non_empty(list, CollectionType::DfList)?
            .iter()
            .map(case_to_batch)
            .collect::<Result<_>>()?;
        Ok(Collection::DfList(batches))
    }

    pub(super) fn from_pd_multiindex_to_numpy2d(x: &Collection) -> Result<Collection> {
        let batch = pd_multiindex(x)?;
        if batch.num_columns() != 3 {
            return Err(multivariate_error(CollectionType::Numpy2D));
        }
        let list = multiindex_to_list(batch)?;
        if list.is_empty() {
            return Ok(Collection::Numpy2D(Array2::zeros((0, 0))));
        }
        Ok(Collection::Numpy2D(list_to_array2(&list, CollectionType::Numpy2D)?))
    }

    pub(super) fn from_pd_multiindex_to_pd_wide(x: &Collection) -> Result<Collection> {
        let batch = pd_multiindex(x)?;
        if batch.num_columns() != 3 {
            return Err(multivariate_error(CollectionType::PdWide));
        }
        let list = multiindex_to_list(batch)?;
        let a = if list.is_empty() {
            Array2::zeros((0, 0))
        } else {
            list_to_array2(&list, CollectionType::PdWide)?
        };
        Ok(Collection::PdWide(array2_to_wide(&a)?))
    }
}
