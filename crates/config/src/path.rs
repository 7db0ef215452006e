//! File name validation for downloaded databases.
//!
//! Every raw database lands directly inside the databases folder under the
//! last path segment of its URL. That segment comes from user configuration,
//! so it is checked before it is ever joined onto a local path.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates that `name` is a single, plain file name.
///
/// > **Note:** Backslashes are rejected outright. A URL segment such as
/// >           `..%5C..%5Cboot.ini` must never turn into a path on Windows.
///
/// # Examples
///
/// ```
/// use pindex_config::validate_file_name;
/// assert_eq!(validate_file_name("vpsdb.json").unwrap(), "vpsdb.json");
/// assert!(validate_file_name("../vpsdb.json").is_err());
/// assert!(validate_file_name("a/b.json").is_err());
/// assert!(validate_file_name("").is_err());
/// ```
pub fn validate_file_name(name: impl AsRef<str>) -> Result<String> {
    let name = name.as_ref();
    let invalid = || ErrorKind::InvalidPath(PathBuf::from(name));
    if name.contains(['/', '\\', '\0']) {
        exn::bail!(invalid());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(s)), None) if s == name => Ok(name.to_string()),
        _ => exn::bail!(invalid()),
    }
}
