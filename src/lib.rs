//! Layout conversion and shape checks for collections of time series.
//!
//! A collection of cases can be held as a 3D array, a flat 2D array, a list
//! of per-case arrays, a list of per-case Arrow tables, one wide Arrow table
//! or a long Arrow table keyed by case and time point. [`convert_collection`]
//! moves data between these layouts without touching the values, and the
//! predicates in [`data::validation`] answer shape questions about any of them.

pub mod data;
pub mod error;

pub use data::convert::{convert_collection, convert_collection_to, converter_for, Converter};
pub use data::model::Collection;
pub use data::resolve::{resolve_equal_length_inner_type, resolve_unequal_length_inner_type};
pub use data::types::CollectionType;
pub use data::validation::{
    equal_length, get_n_cases, get_n_channels, get_n_timepoints, get_series_lengths, get_type,
    has_missing, is_equal_length, is_univariate,
};
pub use error::{CollectionError, Result};
