//! Path splitting and notation conversion.
//!
//! Inbound requests carry absolute, slash-separated paths. The volume side
//! has no "resolve a full path" primitive, so every path is first split into
//! a parent-directory part and a leaf name. On the volume, the parent
//! directory is addressed AmigaDOS-style: an empty path component (a doubled
//! slash) means "up one level", where host paths use `..`.

/// A path split into its parent-directory part and its leaf name.
///
/// Both parts are given relative to the volume root, with leading slashes
/// already stripped. An empty `leaf` means the path denoted a directory
/// itself (the volume root, or a path with a trailing slash) rather than an
/// entry inside one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    pub dir_path: String,
    pub leaf: String,
}

impl SplitPath {
    /// True if the original path denoted the volume root.
    pub fn is_root(&self) -> bool {
        self.dir_path.is_empty() && self.leaf.is_empty()
    }
}

/// Split a path into parent directory and leaf name.
///
/// Any number of leading slashes is tolerated (requests normally carry
/// exactly one). No I/O and no normalization beyond the leading slashes:
/// doubled slashes inside the path are kept, because on the volume side they
/// carry parent-directory meaning.
pub fn split(path: &str) -> SplitPath {
    let rel = strip_leading_slashes(path);
    match rel.rfind('/') {
        Some(idx) => SplitPath {
            dir_path: rel[..idx].to_string(),
            leaf: rel[idx + 1..].to_string(),
        },
        None => SplitPath {
            dir_path: String::new(),
            leaf: rel.to_string(),
        },
    }
}

/// Strip all leading `/` from a path.
pub fn strip_leading_slashes(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Collapse every `//` run into a single slash.
pub fn collapse_double_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if !prev_slash {
                out.push(ch);
            }
            prev_slash = true;
        } else {
            out.push(ch);
            prev_slash = false;
        }
    }
    out
}

/// Convert host-style parent references to the volume's native notation.
///
/// Host shells say `cd ../tmp`; AmigaDOS says `cd //tmp` - an empty path
/// component climbs one level. Replaces every `../` with `//` and a trailing
/// `/..` with `//`.
pub fn parents_to_volume_notation(path: &str) -> String {
    let mut out = path.to_string();
    while let Some(idx) = out.find("../") {
        out.replace_range(idx..idx + 3, "//");
    }
    while out.ends_with("/..") {
        let start = out.len() - 3;
        out.replace_range(start.., "//");
    }
    out
}

/// Sanitize a host directory path for use on the volume side.
///
/// Doubled slashes must be collapsed before `..` conversion; otherwise a
/// doubled slash already present in the input would be indistinguishable
/// from a converted parent marker.
pub fn to_volume_notation(path: &str) -> String {
    parents_to_volume_notation(&collapse_double_slashes(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let p = split("/Plot/plot.c");
        assert_eq!(p.dir_path, "Plot");
        assert_eq!(p.leaf, "plot.c");
    }

    #[test]
    fn test_split_top_level() {
        let p = split("/README.list49");
        assert_eq!(p.dir_path, "");
        assert_eq!(p.leaf, "README.list49");
    }

    #[test]
    fn test_split_relative_leaf() {
        // No directory part at all: entry in the current directory.
        let p = split("plot.c");
        assert_eq!(p.dir_path, "");
        assert_eq!(p.leaf, "plot.c");
    }

    #[test]
    fn test_split_nested() {
        let p = split("/Polygon/iffwriter/iffwriter.h");
        assert_eq!(p.dir_path, "Polygon/iffwriter");
        assert_eq!(p.leaf, "iffwriter.h");
    }

    #[test]
    fn test_split_root() {
        assert!(split("/").is_root());
        assert!(split("///").is_root());
        assert!(split("").is_root());
    }

    #[test]
    fn test_split_leading_slashes() {
        let p = split("///Plot/plot.c");
        assert_eq!(p.dir_path, "Plot");
        assert_eq!(p.leaf, "plot.c");
    }

    #[test]
    fn test_split_trailing_slash() {
        // Trailing slash: the path names the directory itself.
        let p = split("/Plot/");
        assert_eq!(p.dir_path, "Plot");
        assert_eq!(p.leaf, "");
        assert!(!p.is_root());
    }

    #[test]
    fn test_split_reconstruction() {
        for path in ["Plot/plot.c", "a/b/c", "x"] {
            let p = split(path);
            let joined = if p.dir_path.is_empty() {
                p.leaf.clone()
            } else {
                format!("{}/{}", p.dir_path, p.leaf)
            };
            assert_eq!(joined, path);
        }
    }

    #[test]
    fn test_split_keeps_parent_marker() {
        // "dstdir//srcdir": enter dstdir, climb back up, then srcdir.
        let p = split("dstdir//srcdir");
        assert_eq!(p.dir_path, "dstdir/");
        assert_eq!(p.leaf, "srcdir");
    }

    #[test]
    fn test_collapse_double_slashes() {
        assert_eq!(collapse_double_slashes("a//b"), "a/b");
        assert_eq!(collapse_double_slashes("a////b//c"), "a/b/c");
        assert_eq!(collapse_double_slashes("a/b"), "a/b");
    }

    #[test]
    fn test_parents_to_volume_notation() {
        assert_eq!(parents_to_volume_notation("../tmp"), "//tmp");
        assert_eq!(parents_to_volume_notation("a/../b"), "a//b");
        assert_eq!(parents_to_volume_notation("a/sub/.."), "a/sub//");
    }

    #[test]
    fn test_to_volume_notation_order() {
        // An input doubled slash is collapsed first, so it is not mistaken
        // for a converted parent marker afterwards.
        assert_eq!(to_volume_notation("a//b/../c"), "a/b//c");
    }
}
