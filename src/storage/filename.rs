//! Storage key policy
//!
//! A storage key must name a single entry directly inside the upload
//! directory, so anything that could act as a path component is refused.

use crate::errors::Error;

/// Check that `name` can be joined onto the upload directory without
/// leaving it.
pub fn validate(name: &str) -> Result<&str, Error> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(&['/', '\\', '\0'][..]);

    if unsafe_name {
        return Err(Error::InvalidFilename {
            name: name.to_string(),
        });
    }
    Ok(name)
}
