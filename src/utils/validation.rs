#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Returns the lowercased suffix after the last `.`, if the name has one.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Checks a client-supplied filename against the extension allow-set.
/// The name must contain a `.` and its final suffix, case-insensitively,
/// must be one of `allowed` (which is expected to be lowercase already).
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    file_extension(filename).is_some_and(|ext| allowed.iter().any(|a| *a == ext))
}

/// Validates that a derived user name can be used as exactly one directory
/// component below the upload root.
pub fn validate_user_segment(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError {
            code: "EMPTY_IDENTITY",
            message: "Principal name is empty".to_string(),
        });
    }

    if name == "." || name == ".." {
        return Err(ValidationError {
            code: "INVALID_IDENTITY",
            message: format!("Principal name '{}' is not a valid folder name", name),
        });
    }

    if name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        tracing::warn!("Path traversal attempt in principal name: {:?}", name);
        return Err(ValidationError {
            code: "INVALID_IDENTITY",
            message: "Principal name contains path separators or control characters"
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_set() -> Vec<String> {
        vec!["xlsx".to_string(), "xlsm".to_string()]
    }

    #[test]
    fn test_allowed_file() {
        let allowed = allow_set();
        assert!(allowed_file("report.xlsx", &allowed));
        assert!(allowed_file("macro.xlsm", &allowed));
        assert!(allowed_file("REPORT.XLSX", &allowed));
        assert!(allowed_file("q3.final.XlSm", &allowed));

        assert!(!allowed_file("xlsx", &allowed));
        assert!(!allowed_file("report.csv", &allowed));
        assert!(!allowed_file("report.xlsx.exe", &allowed));
        assert!(!allowed_file("report.", &allowed));
        assert!(!allowed_file("", &allowed));
    }

    #[test]
    fn test_file_extension_uses_last_dot() {
        assert_eq!(file_extension("a.b.XLSX").as_deref(), Some("xlsx"));
        assert_eq!(file_extension(".xlsx").as_deref(), Some("xlsx"));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn test_validate_user_segment() {
        assert!(validate_user_segment("alice").is_ok());
        assert!(validate_user_segment("first.last").is_ok());
        assert!(validate_user_segment("default_user").is_ok());

        assert_eq!(validate_user_segment("").unwrap_err().code, "EMPTY_IDENTITY");
        assert!(validate_user_segment(".").is_err());
        assert!(validate_user_segment("..").is_err());
        assert!(validate_user_segment("../etc").is_err());
        assert!(validate_user_segment("a\\b").is_err());
        assert!(validate_user_segment("tab\there").is_err());
    }
}
