//! Update types for entity mutations.
//!
//! Each update struct has `Option` fields. Only `Some` fields generate SET
//! clauses in the dynamic UPDATE SQL. Nullable columns use
//! `Option<Option<T>>`: absent leaves the column alone, `null` clears it.
//! The update itself is serialized as the activity entry `detail` (changed
//! fields only), and deserialized straight from API request bodies.

pub mod ach;
pub mod actor;
pub mod framework;
pub mod source;
pub mod workspace;

use serde::{Deserialize, Deserializer};

/// Keep an explicit JSON `null` as `Some(None)` instead of collapsing it.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
