use crate::error::AppError;

/// The reserved separator used in document ids in place of `/`.
pub const ID_SEPARATOR: char = '|';

/// A user-entered page path normalized into its canonical parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Parent directory, always starting with `/`, never ending with one
    /// except root `/`.
    pub path: String,
    /// Leaf segment, never empty.
    pub name: String,
    /// `path` and `name` joined, redundant slashes collapsed, no leading
    /// slash.
    pub full_path: String,
    /// `full_path` with every `/` replaced by [`ID_SEPARATOR`].
    pub doc_id: String,
}

impl ResolvedPath {
    /// Normalize a raw slash-delimited path as typed by a user.
    ///
    /// `foo/bar/`, `/foo/bar` and `foo//bar` all resolve to the same
    /// parts. Resolving the returned `full_path` again is a fixpoint.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut cleaned = raw.trim().to_string();
        while cleaned.contains("//") {
            cleaned = cleaned.replace("//", "/");
        }
        if cleaned.contains(ID_SEPARATOR) {
            return Err(AppError::Validation(format!(
                "Page paths must not contain the reserved character '{ID_SEPARATOR}'"
            )));
        }

        let trimmed = cleaned.strip_suffix('/').unwrap_or(&cleaned);

        let (path, name) = match trimmed.rfind('/') {
            None => ("/".to_string(), trimmed.to_string()),
            Some(0) => ("/".to_string(), trimmed[1..].to_string()),
            Some(i) => (trimmed[..i].to_string(), trimmed[i + 1..].to_string()),
        };

        if name.is_empty() {
            return Err(AppError::Validation(
                "You must provide a page name.".to_string(),
            ));
        }

        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        let full_path = if path == "/" {
            name.clone()
        } else {
            format!("{path}/{name}")
        };
        let full_path = full_path.trim_start_matches('/').to_string();
        let doc_id = derive_doc_id(&full_path);

        Ok(Self {
            path,
            name,
            full_path,
            doc_id,
        })
    }
}

/// Derive the canonical document id for a normalized full path.
pub fn derive_doc_id(full_path: &str) -> String {
    full_path.replace('/', &ID_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_lands_in_root() {
        let resolved = ResolvedPath::parse("bar").unwrap();
        assert_eq!(resolved.path, "/");
        assert_eq!(resolved.name, "bar");
        assert_eq!(resolved.full_path, "bar");
        assert_eq!(resolved.doc_id, "bar");
    }

    #[test]
    fn leading_and_trailing_slashes_are_equivalent() {
        let canonical = ResolvedPath::parse("foo/bar").unwrap();
        assert_eq!(ResolvedPath::parse("/foo/bar/").unwrap(), canonical);
        assert_eq!(ResolvedPath::parse("/foo/bar").unwrap(), canonical);
        assert_eq!(ResolvedPath::parse("foo/bar/").unwrap(), canonical);
        assert_eq!(canonical.path, "/foo");
        assert_eq!(canonical.name, "bar");
        assert_eq!(canonical.full_path, "foo/bar");
        assert_eq!(canonical.doc_id, "foo|bar");
    }

    #[test]
    fn nested_path() {
        let resolved = ResolvedPath::parse("wep/html/div").unwrap();
        assert_eq!(resolved.path, "/wep/html");
        assert_eq!(resolved.name, "div");
        assert_eq!(resolved.full_path, "wep/html/div");
        assert_eq!(resolved.doc_id, "wep|html|div");
    }

    #[test]
    fn doubled_slashes_collapse() {
        let resolved = ResolvedPath::parse("foo//bar").unwrap();
        assert_eq!(resolved.full_path, "foo/bar");
    }

    #[test]
    fn resolution_is_idempotent() {
        for raw in ["bar", "/foo/bar/", "wep/html/div", "a/b/c/d"] {
            let once = ResolvedPath::parse(raw).unwrap();
            let twice = ResolvedPath::parse(&once.full_path).unwrap();
            assert_eq!(once.full_path, twice.full_path, "input {raw:?}");
            assert_eq!(once.doc_id, twice.doc_id, "input {raw:?}");
        }
    }

    #[test]
    fn empty_inputs_fail() {
        for raw in ["", "/", "//", "   "] {
            match ResolvedPath::parse(raw) {
                Err(AppError::Validation(_)) => {}
                other => panic!("expected validation error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn reserved_separator_rejected() {
        match ResolvedPath::parse("foo|bar") {
            Err(AppError::Validation(msg)) => assert!(msg.contains('|')),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
