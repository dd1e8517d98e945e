//! Storage name utilities.
//!
//! Each record type gets its own index directory named after the type.
//! Type names come from application code, so they are mapped onto a
//! conservative file-name alphabet before touching the filesystem.

/// Map a record type name onto a deterministic directory name.
///
/// ASCII letters, digits, `-` and `_` are kept as-is; every other character
/// becomes `_`. A leading `.` is replaced too so the result can never be a
/// hidden or relative directory.
///
/// Returns `None` for names that are empty after trimming.
///
/// The mapping is not injective: `a.b`, `a/b` and `a_b` all become `a_b`,
/// so such types share one directory. Opening the second one then fails
/// with a schema mismatch against the stored index metadata instead of
/// mixing documents.
///
/// # Examples
///
/// ```
/// use sift_core::util::ids::storage_name;
///
/// assert_eq!(storage_name("Article").as_deref(), Some("Article"));
/// assert_eq!(storage_name("blog::Post").as_deref(), Some("blog__Post"));
/// assert_eq!(storage_name("../etc").as_deref(), Some("___etc"));
/// assert_eq!(storage_name("   "), None);
/// ```
pub fn storage_name(type_name: &str) -> Option<String> {
    let trimmed = type_name.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(
        trimmed
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect(),
    )
}
