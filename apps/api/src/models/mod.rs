pub mod application;
pub mod job;

use serde::{Deserialize, Deserializer};

/// Field deserializer that reads an explicit `null` as `T::default()`.
///
/// Pairs with the struct-level `#[serde(default)]`, which only covers absent fields.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
