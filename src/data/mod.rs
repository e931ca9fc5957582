/// Collection layer: layout tags, containers, predicates and conversion.
///
/// Architecture:
/// ```text
///   caller-built Collection
///        │
///        ▼
///   ┌────────────┐
///   │ validation │  get_type / n_cases / equal length / missing
///   └────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │  convert   │  convert_collection → from_<src>_to_<dst>
///   └────────────┘
///        │
///        ▼
///   Collection in the requested layout
///
///   resolve: accepted layout names → internal layout to standardize on
/// ```

pub mod convert;
pub mod model;
pub mod resolve;
pub mod types;
pub mod validation;
