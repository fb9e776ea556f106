//! Utility functions

use url::Url;
use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string().replace('-', "").to_uppercase()
}

/// Extract the logical object path from a storage URL.
///
/// Returns the percent-decoded path component; scheme, host, query string
/// (SAS tokens included) and fragment are all discarded.
pub fn path_from_url(url: &Url) -> String {
    percent_encoding::percent_decode_str(url.path())
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_url_plain() {
        let url = Url::parse("https://acct.dfs.core.windows.net/container/dir/file.txt").unwrap();
        assert_eq!(path_from_url(&url), "/container/dir/file.txt");
    }

    #[test]
    fn test_path_from_url_strips_sas_token() {
        let url = Url::parse(
            "https://acct.dfs.core.windows.net/container/dir/file.txt?sv=2023-11-03&sig=abc%3D",
        )
        .unwrap();
        assert_eq!(path_from_url(&url), "/container/dir/file.txt");
    }

    #[test]
    fn test_path_from_url_strips_fragment() {
        let url = Url::parse("https://acct.blob.core.windows.net/c/a.txt#frag").unwrap();
        assert_eq!(path_from_url(&url), "/c/a.txt");
    }

    #[test]
    fn test_path_from_url_decodes_segments() {
        let url = Url::parse("https://acct.dfs.core.windows.net/c/dir%20one/b%C3%A9.txt").unwrap();
        assert_eq!(path_from_url(&url), "/c/dir one/bé.txt");
    }

    #[test]
    fn test_path_from_url_account_root() {
        let url = Url::parse("https://acct.dfs.core.windows.net/").unwrap();
        assert_eq!(path_from_url(&url), "/");
    }

    #[test]
    fn test_generate_request_id() {
        let id = generate_request_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }
}
