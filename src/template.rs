use crate::config::{BarrelDefinition, ProcessingOptions, SourceRule};
use crate::error::{BarrelError, Result};
use crate::scanner::{DiscoveryRecord, FileScanner, normalize_path};
use crate::transform::{apply_chain, to_pascal_case};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// The single built-in template kind.
pub const VARIABLE_TEMPLATE: &str = "variable-template";

/// One `{name}` or `{name:chain}` token found in a template, with its byte
/// span in the template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub start: usize,
    pub end: usize,
    pub name: String,
    pub chain: Option<String>,
}

/// The raw value bound to a variable for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    pub value: String,
    pub casing: String,
}

impl VariableBinding {
    pub fn raw(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            casing: "raw".to_string(),
        }
    }
}

/// One discovered candidate handed from discovery into rendering.
#[derive(Debug, Clone)]
pub struct PathMatch {
    pub path: PathBuf,
    pub variables: Vec<(String, VariableBinding)>,
}

/// What one barrel generation produces: the rendered text plus any
/// recoverable warnings collected along the way. The core never prints.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub name: String,
    pub output: PathBuf,
    pub content: String,
    pub warnings: Vec<String>,
}

/// Tokenizes a template into a flat ordered list of placeholders. Non-nested
/// tokens only; a stray `{` never matches.
///
/// # Errors
///
/// Returns `BarrelError::Regex` if the token pattern fails to compile.
pub fn parse_placeholders(template: &str) -> Result<Vec<Placeholder>> {
    let pattern = Regex::new(r"\{([^{}:]+)(?::([^{}]+))?\}")?;
    let mut placeholders = Vec::new();

    for capture in pattern.captures_iter(template) {
        if let Some(full) = capture.get(0)
            && let Some(name) = capture.get(1)
        {
            placeholders.push(Placeholder {
                start: full.start(),
                end: full.end(),
                name: name.as_str().to_string(),
                chain: capture.get(2).map(|m| m.as_str().to_string()),
            });
        }
    }

    Ok(placeholders)
}

/// Distinct variable names in first-seen order.
pub fn extract_variables(template: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for placeholder in parse_placeholders(template)? {
        if !names.contains(&placeholder.name) {
            names.push(placeholder.name);
        }
    }
    Ok(names)
}

/// Whether the template scans for files rather than directories: a
/// placeholder immediately followed by a known source extension, or a
/// placeholder literally named `file`.
pub fn is_file_oriented(template: &str) -> Result<bool> {
    let extension_suffix =
        Regex::new(r#"\{[^}:]+(?::[^}]+)?\}\.(ts|js|tsx|jsx|json|md)(?:['"`]|$)"#)?;
    let file_variable = Regex::new(r"\{file(?::[^}]+)?\}")?;
    Ok(extension_suffix.is_match(template) || file_variable.is_match(template))
}

/// Extracts the literal prefix before the first placeholder in the quoted
/// `from` clause and resolves it to the directory to scan.
///
/// # Errors
///
/// - `BarrelError::MissingPathPrefix` if no prefix/placeholder boundary exists.
/// - `BarrelError::ParentTraversal` for `../` prefixes.
pub fn resolve_base_directory(export_template: &str, output_path: &Path) -> Result<PathBuf> {
    let pattern = Regex::new(r#"from ['"]([^'"]*)\{"#)?;
    let Some(capture) = pattern.captures(export_template) else {
        return Err(BarrelError::MissingPathPrefix);
    };

    let mut prefix = capture.get(1).map_or("", |m| m.as_str());
    if let Some(trimmed) = prefix.strip_suffix('/') {
        prefix = trimmed;
    }

    if let Some(rest) = prefix.strip_prefix("./") {
        if rest.is_empty() || rest == "." {
            Ok(output_dir(output_path))
        } else {
            Ok(output_dir(output_path).join(rest))
        }
    } else if prefix.starts_with("../") {
        Err(BarrelError::ParentTraversal)
    } else if prefix == "." {
        Ok(output_dir(output_path))
    } else if prefix.is_empty() {
        Ok(PathBuf::from("."))
    } else {
        // Treated as already process-relative (or absolute).
        Ok(PathBuf::from(prefix))
    }
}

/// Substitutes every placeholder occurrence against the candidate's raw
/// bound values. Occurrences are independent: each chain starts over from
/// the raw value, and no chain at all means pascal-case, never passthrough.
pub fn substitute(
    template: &str,
    variables: &[(String, VariableBinding)],
    warnings: &mut Vec<String>,
) -> Result<String> {
    let mut result = template.to_string();
    for (name, binding) in variables {
        // Spans are replaced back to front so earlier offsets stay valid.
        let placeholders = parse_placeholders(&result)?;
        for placeholder in placeholders.iter().rev() {
            if placeholder.name != *name {
                continue;
            }
            let replacement = match &placeholder.chain {
                Some(chain) => apply_chain(&binding.value, chain, warnings),
                None => to_pascal_case(&binding.value),
            };
            result.replace_range(placeholder.start..placeholder.end, &replacement);
        }
    }
    Ok(result)
}

/// Drops candidates whose rendered import path does not exist on disk.
/// File-oriented templates pass through untouched, since their candidates
/// were scanned from real files.
pub fn filter_existing(
    candidates: Vec<PathMatch>,
    template: &str,
    output_path: &Path,
    warnings: &mut Vec<String>,
) -> Result<Vec<PathMatch>> {
    if is_file_oriented(template)? {
        return Ok(candidates);
    }

    let from_clause = Regex::new(r#"from\s+['"`]([^'"`]+)['"`]"#)?;
    let out_dir = output_dir(output_path);
    let mut kept = Vec::new();

    for candidate in candidates {
        let rendered = substitute(template, &candidate.variables, warnings)?;
        let Some(capture) = from_clause.captures(&rendered) else {
            continue;
        };
        let import_path = capture.get(1).map_or("", |m| m.as_str());

        let resolved = if let Some(rest) = import_path.strip_prefix("./") {
            out_dir.join(rest)
        } else if import_path.starts_with("../") {
            normalize_path(&out_dir.join(import_path))
        } else {
            PathBuf::from(import_path)
        };

        // The rendered path names the module-loader artifact (.js); the
        // file on disk is the source (.ts).
        if map_loader_suffix(&resolved).exists() {
            kept.push(candidate);
        }
    }

    Ok(kept)
}

fn map_loader_suffix(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_suffix(".js")) {
        Some(stem) => PathBuf::from(format!("{stem}.ts")),
        None => path.to_path_buf(),
    }
}

/// Renders the surviving candidates into the final text: one export line per
/// candidate, newline-joined with a trailing newline, optionally preceded by
/// a comment banner block.
pub fn render(
    template: &str,
    candidates: &[PathMatch],
    banner: Option<&str>,
    warnings: &mut Vec<String>,
) -> Result<String> {
    let mut lines = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        lines.push(substitute(template, &candidate.variables, warnings)?);
    }
    let body = format!("{}\n", lines.join("\n"));

    Ok(match banner {
        Some(banner) => {
            let commented: Vec<String> =
                banner.lines().map(|line| format!("// {line}")).collect();
            format!("{}\n\n{}", commented.join("\n"), body)
        }
        None => body,
    })
}

/// Runs the whole pipeline for one barrel definition:
/// validate, resolve the base directory, scan, bind, filter, render.
/// Pure given the filesystem contents; holds no state between calls.
///
/// # Errors
///
/// Fatal conditions only: unknown template kind, missing/empty export,
/// zero or multiple variables, missing path prefix, parent traversal, or a
/// scan rule failing outright. Recoverable conditions end up in
/// `GenerationResult::warnings`.
pub fn generate_barrel(
    definition: &BarrelDefinition,
    global_options: Option<&ProcessingOptions>,
) -> Result<GenerationResult> {
    let mut warnings = Vec::new();
    let template_spec = &definition.template;

    match template_spec.name.as_str() {
        VARIABLE_TEMPLATE => {}
        other => {
            return Err(BarrelError::UnknownTemplate {
                name: other.to_string(),
            });
        }
    }
    if template_spec.export.trim().is_empty() {
        return Err(BarrelError::MissingExport {
            barrel: definition.name.clone(),
        });
    }

    let export = &template_spec.export;
    let variables = extract_variables(export)?;
    if variables.is_empty() {
        return Err(BarrelError::NoVariables);
    }
    if variables.len() > 1 {
        return Err(BarrelError::MultipleVariables {
            names: variables.join(", "),
        });
    }
    let variable = &variables[0];

    let base_dir = resolve_base_directory(export, &definition.output)?;
    let file_oriented = is_file_oriented(export)?;
    let options = definition
        .options
        .clone()
        .or_else(|| global_options.cloned())
        .unwrap_or_default();

    let scanner = FileScanner::new(options.extensions.clone());
    let mut records = if !definition.sources.is_empty() {
        scanner.scan_sources(&definition.sources, &definition.exclude, &mut warnings)?
    } else if file_oriented {
        // The template-derived file scan is fixed to `.ts` sources,
        // independent of the configured extension allow-list.
        let derived = FileScanner::new(vec![".ts".to_string()]);
        derived.scan_sources(
            &[derived_file_rule(&base_dir)],
            &definition.exclude,
            &mut warnings,
        )?
    } else if let Some(required) = &template_spec.required_file {
        let rule = SourceRule {
            path: base_dir.clone(),
            recursive: false,
            max_depth: None,
            pattern: "*".to_string(),
            directory_pattern: true,
            index_file: required.clone(),
        };
        scanner.scan_sources(&[rule], &definition.exclude, &mut warnings)?
    } else {
        // Without a required file, every immediate subdirectory is a
        // candidate; filter_existing alone decides which rendered paths
        // survive.
        list_subdirectories(&base_dir, &mut warnings)
    };

    if file_oriented {
        // Never let the barrel re-export itself.
        let output_name = definition.output.file_name().map(|n| n.to_os_string());
        records.retain(|record| output_name.as_deref() != record.path.file_name());
        if options.validate_exports {
            records.retain(|record| scanner.validate_file(&record.path, &mut warnings));
        }
    }

    let candidates: Vec<PathMatch> = records
        .iter()
        .map(|record| PathMatch {
            path: record.path.clone(),
            variables: vec![(variable.clone(), VariableBinding::raw(&record.name))],
        })
        .collect();

    let candidates = filter_existing(candidates, export, &definition.output, &mut warnings)?;
    let content = render(
        export,
        &candidates,
        template_spec.banner.as_deref(),
        &mut warnings,
    )?;

    Ok(GenerationResult {
        name: definition.name.clone(),
        output: definition.output.clone(),
        content,
        warnings,
    })
}

/// The scan rule used when a file-oriented barrel carries no explicit
/// sources: immediate children of the template's base directory.
fn derived_file_rule(base_dir: &Path) -> SourceRule {
    SourceRule {
        path: base_dir.to_path_buf(),
        recursive: false,
        max_depth: None,
        pattern: "*".to_string(),
        directory_pattern: false,
        index_file: "index.js".to_string(),
    }
}

/// Lists every immediate subdirectory of `base_dir` as a candidate, with no
/// content precondition. An unreadable base directory is a warning, not an
/// error.
fn list_subdirectories(base_dir: &Path, warnings: &mut Vec<String>) -> Vec<DiscoveryRecord> {
    let entries = match fs::read_dir(base_dir) {
        Ok(iter) => iter.flatten(),
        Err(_) => {
            warnings.push(format!("Could not scan directory: {}", base_dir.display()));
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for entry in entries {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }
        let dir_path = entry.path();
        records.push(DiscoveryRecord {
            path: dir_path.clone(),
            name: entry.file_name().to_string_lossy().into_owned(),
            extension: String::new(),
            relative_path: dir_path.clone(),
            directory: dir_path,
        });
    }
    records
}

fn output_dir(output_path: &Path) -> PathBuf {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
