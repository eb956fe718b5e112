use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for barrelgen operations
#[derive(Error, Debug)]
pub enum BarrelError {
    /// IO error when reading files or directories
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file could not be located
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration failed schema or template validation
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// The barrel definition has no export template at all
    #[error("Barrel '{barrel}' requires an \"export\" template")]
    MissingExport { barrel: String },

    /// The export template contains no `{variable}` placeholders
    #[error(
        "No path variables found in export template. Use {{variableName}} in the path portion."
    )]
    NoVariables,

    /// More than one distinct variable bound in a single template
    #[error(
        "Multiple path variables ({names}) are not supported; use a single {{variable}} per template"
    )]
    MultipleVariables { names: String },

    /// No literal path prefix before the first placeholder in the `from` clause
    #[error(
        "Cannot determine path from export template. Expected format: export * from \"./path/{{variable}}/...\""
    )]
    MissingPathPrefix,

    /// Parent directory traversal in the resolved scan prefix
    #[error("Export templates cannot use parent directory references (../)")]
    ParentTraversal,

    /// Template kind other than the single built-in one
    #[error("Template '{name}' not found")]
    UnknownTemplate { name: String },

    /// Regex compilation error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Glob pattern error when building exclude sets
    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),

    /// `WalkDir` error when traversing directories
    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BarrelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BarrelError::ConfigNotFound {
            path: PathBuf::from("/test/barrel.config.json"),
        };
        assert_eq!(
            format!("{err}"),
            "Configuration file not found: /test/barrel.config.json"
        );

        let err = BarrelError::MissingExport {
            barrel: "main".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Barrel 'main' requires an \"export\" template"
        );

        let err = BarrelError::NoVariables;
        assert!(format!("{err}").contains("{variableName}"));

        let err = BarrelError::MultipleVariables {
            names: "parent, child".to_string(),
        };
        assert!(format!("{err}").contains("parent, child"));

        let err = BarrelError::ParentTraversal;
        assert!(format!("{err}").contains("../"));

        let err = BarrelError::UnknownTemplate {
            name: "grouped".to_string(),
        };
        assert_eq!(format!("{err}"), "Template 'grouped' not found");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: BarrelError = io_err.into();
        assert!(matches!(err, BarrelError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: BarrelError = json_err.into();
        assert!(matches!(err, BarrelError::Json(_)));
    }
}
