//! Message id validation and path derivation.
//!
//! Paths are a pure function of the base path and the id, and are never
//! stored anywhere. Ids are sharded by their first two bytes so that no
//! single directory grows unbounded:
//!
//! ```text
//! <base>/<id[0..2]>/<id>.data   # ids of two or more bytes
//! <base>/misc/<id>.data         # shorter ids
//! ```
//!
//! The layout is shared with existing stores and must not change.

use crate::error::InvalidIdError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Maximum message id length in bytes.
pub const MAX_ID_LEN: usize = 255;

/// Extension appended to every data file.
pub const DATA_EXTENSION: &str = "data";

/// Shard directory for ids shorter than the shard prefix.
pub const MISC_SHARD: &str = "misc";

const SHARD_PREFIX_LEN: usize = 2;

/// Checks that a message id is safe to turn into a path.
///
/// Rules are applied in order: non-empty, no `..`, no `/` or `\`,
/// at most [`MAX_ID_LEN`] bytes.
///
/// # Errors
///
/// Returns the first rule the id breaks.
pub fn validate_message_id(id: &str) -> Result<(), InvalidIdError> {
    if id.is_empty() {
        return Err(InvalidIdError::Empty);
    }
    if id.contains("..") {
        return Err(InvalidIdError::Traversal);
    }
    if id.contains(['/', '\\']) {
        return Err(InvalidIdError::Separator);
    }
    if id.len() > MAX_ID_LEN {
        return Err(InvalidIdError::TooLong { len: id.len() });
    }
    Ok(())
}

/// Returns the data file path for `id` under `base`.
///
/// The id must already have passed [`validate_message_id`].
#[must_use]
pub fn data_path(base: &Path, id: &str) -> PathBuf {
    let mut path = base.join(shard_name(id));
    path.push(format!("{id}.{DATA_EXTENSION}"));
    path
}

fn shard_name(id: &str) -> &OsStr {
    if id.len() < SHARD_PREFIX_LEN {
        return OsStr::new(MISC_SHARD);
    }
    shard_prefix(id)
}

// Raw bytes keep multi-byte ids compatible with stores written by
// byte-slicing implementations.
#[cfg(unix)]
fn shard_prefix(id: &str) -> &OsStr {
    use std::os::unix::ffi::OsStrExt;
    OsStr::from_bytes(&id.as_bytes()[..SHARD_PREFIX_LEN])
}

#[cfg(not(unix))]
fn shard_prefix(id: &str) -> &OsStr {
    let mut end = SHARD_PREFIX_LEN;
    while !id.is_char_boundary(end) {
        end += 1;
    }
    OsStr::new(&id[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_empty() {
        assert_eq!(validate_message_id(""), Err(InvalidIdError::Empty));
    }

    #[test]
    fn rejects_traversal() {
        assert_eq!(validate_message_id("../etc"), Err(InvalidIdError::Traversal));
        assert_eq!(validate_message_id("a..b"), Err(InvalidIdError::Traversal));
    }

    #[test]
    fn rejects_separators() {
        assert_eq!(validate_message_id("a/b"), Err(InvalidIdError::Separator));
        assert_eq!(validate_message_id("a\\b"), Err(InvalidIdError::Separator));
    }

    #[test]
    fn length_limit() {
        assert!(validate_message_id(&"x".repeat(MAX_ID_LEN)).is_ok());
        assert_eq!(
            validate_message_id(&"x".repeat(MAX_ID_LEN + 1)),
            Err(InvalidIdError::TooLong { len: 256 })
        );
    }

    #[test]
    fn single_dot_is_allowed() {
        assert!(validate_message_id("msg.1").is_ok());
        assert!(validate_message_id(".").is_ok());
    }

    #[test]
    fn shards_by_two_byte_prefix() {
        let base = Path::new("/spool");
        assert_eq!(
            data_path(base, "abcdef"),
            PathBuf::from("/spool/ab/abcdef.data")
        );
        assert_eq!(data_path(base, "ab"), PathBuf::from("/spool/ab/ab.data"));
    }

    #[test]
    fn short_ids_go_to_misc() {
        let base = Path::new("/spool");
        assert_eq!(data_path(base, "x"), PathBuf::from("/spool/misc/x.data"));
    }

    #[cfg(unix)]
    #[test]
    fn multibyte_prefix_uses_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let path = data_path(Path::new("/spool"), "é1");
        let shard = path.parent().unwrap().file_name().unwrap();
        assert_eq!(shard.as_bytes(), "é".as_bytes());

        let path = data_path(Path::new("/spool"), "aé");
        let shard = path.parent().unwrap().file_name().unwrap();
        assert_eq!(shard.as_bytes(), &"aé".as_bytes()[..2]);
    }

    proptest! {
        #[test]
        fn same_prefix_shares_parent(
            prefix in "[a-zA-Z0-9]{2}",
            a in "[a-zA-Z0-9_-]{0,20}",
            b in "[a-zA-Z0-9_-]{0,20}",
        ) {
            prop_assume!(a != b);
            let base = Path::new("/spool");
            let p1 = data_path(base, &format!("{prefix}{a}"));
            let p2 = data_path(base, &format!("{prefix}{b}"));

            prop_assert_eq!(p1.parent(), p2.parent());
            prop_assert_ne!(p1.file_name(), p2.file_name());
            prop_assert_eq!(p1.parent().unwrap(), base.join(&prefix));
        }

        #[test]
        fn short_ids_always_misc(id in "[a-zA-Z0-9_-]") {
            let path = data_path(Path::new("/spool"), &id);
            prop_assert_eq!(path.parent().unwrap(), Path::new("/spool/misc"));
        }

        #[test]
        fn valid_ids_stay_under_base(id in "[a-zA-Z0-9_.-]{1,255}") {
            prop_assume!(!id.contains(".."));
            prop_assert!(validate_message_id(&id).is_ok());

            let base = Path::new("/spool");
            let path = data_path(base, &id);
            prop_assert_eq!(path.parent().unwrap().parent().unwrap(), base);
        }
    }
}
