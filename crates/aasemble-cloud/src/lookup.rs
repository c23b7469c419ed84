//! Attribute-based resource lookup

use crate::error::{CloudError, Result};

/// Return the first resource whose `attr` equals `value`
///
/// `attr` names the attribute for error messages; `get` reads it.
pub fn get_resource_by_attr<T, I, F>(resources: I, attr: &str, value: &str, get: F) -> Result<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> &str,
{
    resources
        .into_iter()
        .find(|resource| get(resource) == value)
        .ok_or_else(|| CloudError::ResourceNotFound(format!("{} = {}", attr, value)))
}
