//! Path splitting helpers.

use crate::error::{FsError, Result};

/// Splits a path into its components, ignoring empty segments, so
/// `"/a//b/"` walks the same as `"/a/b"`.
pub fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Splits a path into its parent path and final component.
/// `"/a/b/c"` yields `("/a/b", "c")`; top-level entries yield `"/"` as
/// the parent. Fails on `"/"` itself and on paths with no components.
pub fn parent_and_name(path: &str) -> Result<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let cut = trimmed.rfind('/').ok_or(FsError::InvalidArgument)?;
    let name = &trimmed[cut + 1..];
    if name.is_empty() {
        return Err(FsError::InvalidArgument);
    }
    let parent = if cut == 0 { "/" } else { &trimmed[..cut] };
    Ok((parent, name))
}
