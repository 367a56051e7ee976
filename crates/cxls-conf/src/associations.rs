use camino::Utf8Path;

/// Whether a user-defined association key claims the given file name.
///
/// Keys are matched the way editors spell file associations: the bare file
/// name, `*.<ext>` for its extension, or `**/<name>`. Matching is
/// case-sensitive, so `*.c` does not claim `x.C`.
pub(crate) fn key_matches(key: &str, basename: &str) -> bool {
    if key == basename {
        return true;
    }

    if let Some(name) = key.strip_prefix("**/") {
        return name == basename;
    }

    if let Some(extension) = key.strip_prefix("*.") {
        return Utf8Path::new(basename).extension() == Some(extension);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_basename() {
        assert!(key_matches("x.C", "x.C"));
        assert!(!key_matches("x.C", "y.C"));
    }

    #[test]
    fn test_extension_glob() {
        assert!(key_matches("*.C", "x.C"));
        assert!(!key_matches("*.c", "x.C"));
        assert!(!key_matches("*.C", "x.CC"));
    }

    #[test]
    fn test_recursive_glob() {
        assert!(key_matches("**/x.H", "x.H"));
        assert!(!key_matches("**/x.H", "y.H"));
    }

    #[test]
    fn test_no_extension() {
        assert!(!key_matches("*.C", "Makefile"));
    }
}
