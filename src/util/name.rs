/// Name of the DNS root zone.
pub const ROOT: &str = ".";

const ROOT_DIR_NAME: &str = "root";
const MAX_LABEL_LENGTH: usize = 63;

/// Lowercases a domain and makes it fully qualified.
pub fn normalize(domain: &str) -> String {
    let mut name = domain.trim().to_lowercase();
    if !name.ends_with('.') {
        name.push('.');
    }
    name
}

/// Returns true when the name cannot be put on the wire, e.g. `foo..bar.`.
pub fn is_malformed(domain: &str) -> bool {
    let name = normalize(domain);
    if name == ROOT {
        return false;
    }
    name[..name.len() - 1]
        .split('.')
        .any(|label| label.is_empty() || label.len() > MAX_LABEL_LENGTH)
}

/// Directory name used for a zone below the archive root.
pub fn archive_dir_name(domain: &str) -> String {
    if domain == ROOT {
        return ROOT_DIR_NAME.to_string();
    }
    domain.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("COM"), "com.");
        assert_eq!(normalize("Example.Com."), "example.com.");
        assert_eq!(normalize("."), ".");
        assert_eq!(normalize(""), ".");
    }

    #[test]
    fn test_malformed() {
        assert!(!is_malformed("."));
        assert!(!is_malformed("com."));
        assert!(!is_malformed("xn--p1ai"));
        assert!(is_malformed("foo..bar."));
        assert!(is_malformed(".com."));
        assert!(is_malformed(&format!("{}.com.", "a".repeat(64))));
    }

    #[test]
    fn test_archive_dir_name() {
        assert_eq!(archive_dir_name("."), "root");
        assert_eq!(archive_dir_name("example.com."), "example.com");
        assert_eq!(archive_dir_name("com"), "com");
        assert_eq!(archive_dir_name("Mixed.Case."), "Mixed.Case");
    }
}
