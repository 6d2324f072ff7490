use std::env;
use std::path::PathBuf;

/// Default request body cap: 10 MB
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Process-wide configuration, fixed at startup and carried in `AppState`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Maximum request body size in bytes (default: 10 MB)
    pub max_content_length: usize,

    /// Lowercased extensions accepted for the input upload (default: xlsx, xlsm)
    pub upload_extensions: Vec<String>,

    /// Root directory holding one folder per user (default: "uploads")
    pub upload_path: PathBuf,

    /// Directory holding favicon.ico and the downloadable template (default: "static")
    pub static_dir: PathBuf,

    /// Fixed name of the per-user upload slot (default: "input.xlsx")
    pub input_file_name: String,

    /// Name of the template served by /template_download (default: "template.xlsm")
    pub template_file_name: String,

    /// Scheme used when building external URLs (default: "https")
    pub preferred_url_scheme: String,

    /// Trusted header carrying the signed-in principal
    pub principal_header: String,

    /// Folder name used when the principal header is absent
    pub default_user: String,

    /// Optional file that receives a copy of the log stream
    pub log_file: Option<PathBuf>,

    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            upload_extensions: vec!["xlsx".to_string(), "xlsm".to_string()],
            upload_path: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            input_file_name: "input.xlsx".to_string(),
            template_file_name: "template.xlsm".to_string(),
            preferred_url_scheme: "https".to_string(),
            principal_header: "X-MS-CLIENT-PRINCIPAL-NAME".to_string(),
            default_user: "default_user".to_string(),
            log_file: None,
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    /// for missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            max_content_length: lookup("MAX_CONTENT_LENGTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_content_length),

            upload_extensions: lookup("UPLOAD_EXTENSIONS")
                .map(|v| parse_extensions(&v))
                .filter(|exts| !exts.is_empty())
                .unwrap_or(default.upload_extensions),

            upload_path: lookup("UPLOAD_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.upload_path),

            static_dir: lookup("STATIC_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),

            input_file_name: default.input_file_name,
            template_file_name: default.template_file_name,

            preferred_url_scheme: lookup("PREFERRED_URL_SCHEME")
                .map(|v| v.trim().to_lowercase())
                .filter(|v| v == "http" || v == "https")
                .unwrap_or(default.preferred_url_scheme),

            principal_header: lookup("PRINCIPAL_HEADER")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.principal_header),

            default_user: lookup("DEFAULT_USER")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.default_user),

            log_file: lookup("LOG_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            host: lookup("HOST").unwrap_or(default.host),

            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
        }
    }

    /// Local development preset: plain http, everything else default
    pub fn development() -> Self {
        Self {
            preferred_url_scheme: "http".to_string(),
            ..Self::default()
        }
    }

    pub fn max_content_length_mb(&self) -> usize {
        self.max_content_length / 1024 / 1024
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
