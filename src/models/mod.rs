//! Row mirrors of the backend tables

mod category;
mod checkout;
mod listing;
mod profile;
mod review;

pub use category::*;
pub use checkout::*;
pub use listing::*;
pub use profile::*;
pub use review::*;

use serde::{Deserialize, Deserializer};

/// Read a nullable column into a non-optional field, `null` giving the default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
