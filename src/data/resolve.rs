use super::types::CollectionType;
use crate::error::{CollectionError, Result};

/// Preferred internal layouts for equal-length data, best first.
const EQUAL_LENGTH_PRIORITY: [CollectionType; 6] = [
    CollectionType::Numpy3D,
    CollectionType::NpList,
    CollectionType::Numpy2D,
    CollectionType::PdMultiIndex,
    CollectionType::DfList,
    CollectionType::PdWide,
];

/// Preferred internal layouts for unequal-length data, best first.
const UNEQUAL_LENGTH_PRIORITY: [CollectionType; 3] = [
    CollectionType::NpList,
    CollectionType::DfList,
    CollectionType::PdMultiIndex,
];

fn resolve<S: AsRef<str>>(
    candidates: &[S],
    priority: &[CollectionType],
    kind: &str,
) -> Result<CollectionType> {
    let picked = priority
        .iter()
        .copied()
        .find(|t| candidates.iter().any(|c| c.as_ref() == t.as_str()));
    match picked {
        Some(t) => {
            log::trace!("resolved {kind} inner type {t}");
            Ok(t)
        }
        None => {
            let names: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();
            Err(CollectionError::value_error(format!(
                "No valid {kind} collection type in {names:?}"
            )))
        }
    }
}

/// Pick the layout an estimator accepting `candidates` should store
/// equal-length data in. Unknown names are ignored.
pub fn resolve_equal_length_inner_type<S: AsRef<str>>(candidates: &[S]) -> Result<CollectionType> {
    resolve(candidates, &EQUAL_LENGTH_PRIORITY, "equal length")
}

/// Pick the layout an estimator accepting `candidates` should store
/// unequal-length data in. Unknown names are ignored.
pub fn resolve_unequal_length_inner_type<S: AsRef<str>>(
    candidates: &[S],
) -> Result<CollectionType> {
    resolve(candidates, &UNEQUAL_LENGTH_PRIORITY, "unequal length")
}
