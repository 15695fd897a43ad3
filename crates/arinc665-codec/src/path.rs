//! Directory path conventions.
//!
//! Two representations are in play: the wire format stores a single
//! backslash-delimited string with a leading and trailing `\` (§4.2), while
//! the callback surface (§6.3) uses POSIX-style, `/`-delimited relative
//! paths. Neither representation is a `binrw` type on its own — the wire
//! string is encoded as a plain [`crate::CountedString`]; these are pure
//! conversions between the two textual conventions and a path's component
//! list.

/// Splits a path into its non-empty components, regardless of which
/// separator (`/` or `\`) it used.
pub fn split_components(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Encodes path components into the ARINC 665 wire form: backslash
/// separated, with a leading and trailing `\`. The empty path is `\`.
pub fn components_to_wire_path<S: AsRef<str>>(components: &[S]) -> String {
    let mut out = String::from("\\");
    for component in components {
        out.push_str(component.as_ref());
        out.push('\\');
    }
    out
}

/// Normalizes an arbitrary path string (as might arrive from a caller using
/// `/`) into the ARINC 665 wire form.
pub fn normalize_wire_path(path: &str) -> String {
    components_to_wire_path(&split_components(path))
}

/// Encodes path components into the POSIX-style relative path used by the
/// callback surface: `/`-separated, with a leading `/` and no trailing one
/// (the root directory is `/`).
pub fn components_to_posix_path<S: AsRef<str>>(components: &[S]) -> String {
    if components.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for component in components {
        out.push('/');
        out.push_str(component.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_backslash() {
        assert_eq!(normalize_wire_path(""), "\\");
        assert_eq!(components_to_wire_path::<&str>(&[]), "\\");
    }

    #[test]
    fn forward_slashes_become_back_slashes() {
        assert_eq!(normalize_wire_path("a/b/c"), "\\a\\b\\c\\");
    }

    #[test]
    fn components_round_trip_through_wire_form() {
        let components = split_components("\\LOADS\\APP\\");
        assert_eq!(components, vec!["LOADS".to_string(), "APP".to_string()]);
        assert_eq!(components_to_wire_path(&components), "\\LOADS\\APP\\");
    }

    #[test]
    fn posix_form_has_no_trailing_slash() {
        let components = vec!["LOADS".to_string(), "APP".to_string()];
        assert_eq!(components_to_posix_path(&components), "/LOADS/APP");
        assert_eq!(components_to_posix_path::<&str>(&[]), "/");
    }
}
