use crate::error::{BarrelError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Top-level configuration: a list of barrel definitions plus optional
/// global processing options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrelConfig {
    pub version: String,
    pub barrels: Vec<BarrelDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_options: Option<ProcessingOptions>,
}

/// One barrel to generate: where the output lives, the export template that
/// drives discovery, and optional scan rules / excludes / options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrelDefinition {
    pub name: String,
    pub output: PathBuf,
    pub template: TemplateSpec,
    /// Explicit scan rules; when empty, a single rule is derived from the
    /// export template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ProcessingOptions>,
}

/// The variable template: a raw export statement whose path portion carries
/// `{variable}` / `{variable:chain}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    pub name: String,
    pub export: String,
    #[serde(default)]
    pub mode: OutputMode,
    /// Only include directories containing this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_file: Option<String>,
    /// Comment banner placed above the generated exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

/// How the rendered text is written to the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// The rendered text becomes the whole file.
    #[default]
    Replace,
    /// The rendered text is spliced between marker comments, preserving the
    /// rest of the file.
    PartialReplace,
}

/// Describes one scan location. Read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRule {
    pub path: PathBuf,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub directory_pattern: bool,
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

fn default_pattern() -> String {
    "*.ts".to_string()
}

fn default_index_file() -> String {
    "index.js".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub validate_exports: bool,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_extensions() -> Vec<String> {
    vec![".ts".to_string(), ".tsx".to_string()]
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            validate_exports: false,
            dry_run: false,
        }
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// - `BarrelError::ConfigNotFound` if the file doesn't exist.
/// - `BarrelError::ConfigValidation` for malformed JSON or invalid export
///   templates.
pub fn load_config(path: &Path) -> Result<BarrelConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            BarrelError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BarrelError::Io(e)
        }
    })?;

    let config: BarrelConfig =
        serde_json::from_str(&content).map_err(|e| BarrelError::ConfigValidation {
            message: format!("invalid JSON in {}: {e}", path.display()),
        })?;

    validate_config(&config)?;
    Ok(config)
}

/// Validates every barrel definition's export template.
///
/// # Errors
///
/// Returns `BarrelError::ConfigValidation` naming the offending barrel.
pub fn validate_config(config: &BarrelConfig) -> Result<()> {
    for (index, barrel) in config.barrels.iter().enumerate() {
        validate_export_template(&barrel.template.export).map_err(|e| {
            BarrelError::ConfigValidation {
                message: format!("barrels[{index}].template.export: {e}"),
            }
        })?;
    }
    Ok(())
}

/// Checks that an export template is a quoted `export ... from` statement
/// whose path contains at least one placeholder. Runs before the engine so
/// malformed templates fail as configuration errors, not mid-generation.
pub fn validate_export_template(template: &str) -> std::result::Result<(), String> {
    if !template.contains("export") || !template.contains("from") {
        return Err(
            "export template must be a valid export statement, e.g. export * from \"./path/{variable}\""
                .to_string(),
        );
    }

    let from_clause =
        Regex::new(r#"from\s+(['"]?)([^'"\s]+)(['"]?)"#).map_err(|e| e.to_string())?;
    let Some(capture) = from_clause.captures(template) else {
        return Err(
            "invalid export statement, expected: export * from \"./path/{variable}\"".to_string(),
        );
    };

    let open_quote = capture.get(1).map_or("", |m| m.as_str());
    let path_content = capture.get(2).map_or("", |m| m.as_str());
    let close_quote = capture.get(3).map_or("", |m| m.as_str());

    if open_quote.is_empty() || close_quote.is_empty() {
        return Err(format!(
            "path in export template must be enclosed in quotes, found: {path_content}"
        ));
    }
    if open_quote != close_quote {
        return Err(format!(
            "mismatched quotes in export template: opening {open_quote} does not match closing {close_quote}"
        ));
    }
    if !path_content.contains('{') || !path_content.contains('}') {
        return Err(format!(
            "export template path must contain at least one {{variable}} placeholder, found: {path_content}"
        ));
    }

    Ok(())
}

pub fn config_exists(path: &Path) -> bool {
    path.exists()
}

/// A starting-point configuration for `barrelgen init`.
pub fn sample_config() -> BarrelConfig {
    BarrelConfig {
        version: "1.0".to_string(),
        barrels: vec![
            BarrelDefinition {
                name: "handlers".to_string(),
                output: PathBuf::from("./src/index.ts"),
                template: TemplateSpec {
                    name: "variable-template".to_string(),
                    export: "export * from './handlers/{name}/index.js'".to_string(),
                    mode: OutputMode::Replace,
                    required_file: Some("index.ts".to_string()),
                    banner: Some("This file is auto-generated. Do not edit manually.".to_string()),
                },
                sources: Vec::new(),
                exclude: vec!["**/__tests__".to_string()],
                options: None,
            },
            BarrelDefinition {
                name: "modules".to_string(),
                output: PathBuf::from("./src/modules/index.ts"),
                template: TemplateSpec {
                    name: "variable-template".to_string(),
                    export: "export * from './{file:raw}.js'".to_string(),
                    mode: OutputMode::Replace,
                    required_file: None,
                    banner: None,
                },
                sources: Vec::new(),
                exclude: Vec::new(),
                options: Some(ProcessingOptions {
                    extensions: vec![".ts".to_string()],
                    validate_exports: true,
                    dry_run: false,
                }),
            },
        ],
        global_options: None,
    }
}
