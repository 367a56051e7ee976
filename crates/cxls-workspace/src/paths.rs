use camino::Utf8PathBuf;
use percent_encoding::percent_decode_str;
use tower_lsp_server::ls_types::Uri;

/// Converts a `file:` URI into an absolute path.
///
/// Returns `None` for any other scheme. Scheme comparison ignores case.
#[must_use]
pub fn uri_to_path(uri: &Uri) -> Option<Utf8PathBuf> {
    if !uri.scheme().as_str().eq_ignore_ascii_case("file") {
        return None;
    }

    Some(Utf8PathBuf::from(decode(uri.path().as_str())))
}

/// Best-effort path for a URI of any scheme: the decoded path component.
#[must_use]
pub fn uri_path_lossy(uri: &Uri) -> Utf8PathBuf {
    if let Some(path) = uri_to_path(uri) {
        return path;
    }

    let decoded = percent_decode_str(uri.path().as_str()).decode_utf8_lossy();
    Utf8PathBuf::from(decoded.as_ref())
}

fn decode(encoded_path: &str) -> String {
    let decoded = percent_decode_str(encoded_path).decode_utf8_lossy();
    let path_str = decoded.as_ref();

    #[cfg(windows)]
    let path_str = {
        // Remove leading '/' for paths like /C:/...
        path_str.strip_prefix('/').unwrap_or(path_str)
    };

    path_str.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(text: &str) -> Uri {
        text.parse().unwrap()
    }

    #[test]
    #[cfg(not(windows))]
    fn test_file_uri() {
        let path = uri_to_path(&uri("file:///home/user/project/main.cpp"));
        assert_eq!(path, Some(Utf8PathBuf::from("/home/user/project/main.cpp")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_percent_decoding() {
        let path = uri_to_path(&uri("file:///home/user/my%20project/a%2Bb.C"));
        assert_eq!(path, Some(Utf8PathBuf::from("/home/user/my project/a+b.C")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_scheme_is_case_insensitive() {
        let path = uri_to_path(&uri("FILE:///w/x.C"));
        assert_eq!(path, Some(Utf8PathBuf::from("/w/x.C")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_query_and_fragment_are_not_part_of_the_path() {
        let path = uri_to_path(&uri("file:///w/a.cpp?line=3#top"));
        assert_eq!(path, Some(Utf8PathBuf::from("/w/a.cpp")));
    }

    #[test]
    fn test_non_file_uri() {
        assert_eq!(uri_to_path(&uri("https://example.com/a.cpp")), None);
        assert_eq!(uri_to_path(&uri("untitled:Untitled-1")), None);
    }

    #[test]
    fn test_lossy_path_for_other_schemes() {
        assert_eq!(
            uri_path_lossy(&uri("vscode-remote://ssh-host/src/x.C")),
            Utf8PathBuf::from("/src/x.C")
        );
        assert_eq!(
            uri_path_lossy(&uri("untitled:Untitled-1")),
            Utf8PathBuf::from("Untitled-1")
        );
    }
}
