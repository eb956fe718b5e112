use crate::config::SourceRule;
use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// One filesystem entry considered as a candidate export source: a file, or
/// (in directory mode) a directory whose index file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub path: PathBuf,
    pub name: String,
    pub extension: String,
    pub relative_path: PathBuf,
    pub directory: PathBuf,
}

/// Enumerates filesystem entries under configured source rules.
#[derive(Debug, Clone)]
pub struct FileScanner {
    extensions: Vec<String>,
}

impl FileScanner {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Scans every rule in order and collapses duplicate paths, keeping the
    /// first occurrence. Unreadable directories and unreadable entries are
    /// reported as warnings, never errors.
    pub fn scan_sources(
        &self,
        rules: &[SourceRule],
        excludes: &[String],
        warnings: &mut Vec<String>,
    ) -> Result<Vec<DiscoveryRecord>> {
        let mut all = Vec::new();
        for rule in rules {
            if rule.directory_pattern {
                all.extend(self.scan_directories(
                    &rule.path,
                    &rule.index_file,
                    excludes,
                    rule.recursive,
                    rule.max_depth,
                    warnings,
                ));
            } else {
                all.extend(self.scan_files(rule, excludes, warnings)?);
            }
        }

        let mut seen = HashSet::new();
        all.retain(|record| seen.insert(normalize_path(&record.path)));
        Ok(all)
    }

    /// Directory mode: immediate subdirectories of `source_path` that contain
    /// `index_file`. The record's `name` is the directory's base name and its
    /// `path` points at the index file.
    fn scan_directories(
        &self,
        source_path: &Path,
        index_file: &str,
        excludes: &[String],
        recursive: bool,
        max_depth: Option<usize>,
        warnings: &mut Vec<String>,
    ) -> Vec<DiscoveryRecord> {
        let mut records = Vec::new();
        let entries: Vec<_> = match fs::read_dir(source_path) {
            Ok(iter) => iter.flatten().collect(),
            Err(_) => {
                warnings.push(format!(
                    "Could not scan directory: {}",
                    source_path.display()
                ));
                return records;
            }
        };
        let cwd = process_root();

        for entry in &entries {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            let dir_path = entry.path();

            // Exclusion is substring containment of the pattern (minus the
            // first literal "**/", wherever it sits) inside the path relative
            // to the process root. Weaker than real glob matching; existing
            // configurations rely on which directories this does and does
            // not catch.
            let relative = dir_path
                .strip_prefix(&cwd)
                .unwrap_or(&dir_path)
                .to_string_lossy()
                .into_owned();
            let excluded = excludes.iter().any(|pattern| {
                let needle = pattern.replacen("**/", "", 1);
                relative.contains(&needle)
            });
            if excluded {
                continue;
            }

            let index_path = dir_path.join(index_file);
            if !index_path.exists() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            records.push(DiscoveryRecord {
                path: index_path.clone(),
                name,
                extension: dotted_extension(Path::new(index_file)),
                relative_path: index_path
                    .strip_prefix(&cwd)
                    .unwrap_or(&index_path)
                    .to_path_buf(),
                directory: dir_path,
            });
        }

        if recursive {
            for entry in &entries {
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if !file_type.is_dir() {
                    continue;
                }
                // Each recursive step restarts depth tracking at 1 and hands
                // down a decremented max_depth.
                if max_depth.is_none_or(|depth| depth > 1) {
                    records.extend(self.scan_directories(
                        &entry.path(),
                        index_file,
                        excludes,
                        true,
                        max_depth.map(|depth| depth - 1),
                        warnings,
                    ));
                }
            }
        }

        records
    }

    /// File mode: a depth-limited walk matching `rule.pattern` against file
    /// names, with excludes applied as ignore globs and results filtered to
    /// the allow-listed extensions.
    fn scan_files(
        &self,
        rule: &SourceRule,
        excludes: &[String],
        warnings: &mut Vec<String>,
    ) -> Result<Vec<DiscoveryRecord>> {
        let name_matcher = Glob::new(&rule.pattern)?.compile_matcher();
        let exclude_set = build_exclude_set(excludes)?;
        let cwd = process_root();

        let depth = if rule.recursive {
            rule.max_depth.unwrap_or(usize::MAX)
        } else {
            1
        };

        let mut records = Vec::new();
        for entry in WalkDir::new(&rule.path).min_depth(1).max_depth(depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warnings.push(format!("Could not scan directory: {e}"));
                    continue;
                }
            };
            let path = entry.path();
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if !name_matcher.is_match(Path::new(file_name)) {
                continue;
            }

            let relative = path.strip_prefix(&cwd).unwrap_or(path);
            if let Some(set) = &exclude_set
                && (set.is_match(relative) || set.is_match(path))
            {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(_) => {
                    warnings.push(format!("Could not process file: {}", path.display()));
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let extension = dotted_extension(path);
            if !self.extensions.contains(&extension) {
                continue;
            }

            records.push(DiscoveryRecord {
                path: path.to_path_buf(),
                name: path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                extension,
                relative_path: relative.to_path_buf(),
                directory: path.parent().unwrap_or(Path::new("")).to_path_buf(),
            });
        }

        Ok(records)
    }

    /// Crude export heuristic: the file text must contain an `export`
    /// keyword. Not a parser. Read failure counts as invalid.
    pub fn validate_file(&self, path: &Path, warnings: &mut Vec<String>) -> bool {
        match fs::read_to_string(path) {
            Ok(content) => {
                let has_exports = Regex::new(r"export\s+")
                    .map(|re| re.is_match(&content))
                    .unwrap_or(false);
                if !has_exports {
                    warnings.push(format!("File has no exports: {}", path.display()));
                }
                has_exports
            }
            Err(_) => {
                warnings.push(format!("Could not validate file: {}", path.display()));
                false
            }
        }
    }
}

fn build_exclude_set(excludes: &[String]) -> Result<Option<GlobSet>> {
    if excludes.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in excludes {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}

fn process_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Folds `.` and `..` components without touching the filesystem, so the
/// same entry reached through different spellings deduplicates.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rule(path: &Path) -> SourceRule {
        SourceRule {
            path: path.to_path_buf(),
            recursive: false,
            max_depth: None,
            pattern: "*.ts".to_string(),
            directory_pattern: false,
            index_file: "index.ts".to_string(),
        }
    }

    fn dir_rule(path: &Path) -> SourceRule {
        SourceRule {
            directory_pattern: true,
            ..rule(path)
        }
    }

    fn scanner() -> FileScanner {
        FileScanner::new(vec![".ts".to_string(), ".tsx".to_string()])
    }

    fn names(records: &[DiscoveryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_scan_files_immediate() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("alpha.ts"), "export const a = 1;").unwrap();
        fs::write(temp_dir.path().join("beta.ts"), "export const b = 2;").unwrap();
        fs::write(temp_dir.path().join("notes.md"), "# notes").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested/gamma.ts"), "export {}").unwrap();

        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(&[rule(temp_dir.path())], &[], &mut warnings)
            .unwrap();

        let mut found = names(&records);
        found.sort_unstable();
        assert_eq!(found, vec!["alpha", "beta"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_scan_files_recursive_with_depth() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("top.ts"), "export {}").unwrap();
        fs::create_dir_all(temp_dir.path().join("a/b")).unwrap();
        fs::write(temp_dir.path().join("a/mid.ts"), "export {}").unwrap();
        fs::write(temp_dir.path().join("a/b/deep.ts"), "export {}").unwrap();

        let mut recursive = rule(temp_dir.path());
        recursive.recursive = true;
        recursive.max_depth = Some(2);

        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(&[recursive], &[], &mut warnings)
            .unwrap();

        let mut found = names(&records);
        found.sort_unstable();
        assert_eq!(found, vec!["mid", "top"]);
    }

    #[test]
    fn test_scan_files_extension_filter() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("keep.ts"), "export {}").unwrap();
        fs::write(temp_dir.path().join("skip.d.ts"), "export {}").unwrap();

        let mut only_tsx = rule(temp_dir.path());
        only_tsx.pattern = "*".to_string();

        let mut warnings = Vec::new();
        let records = FileScanner::new(vec![".tsx".to_string()])
            .scan_sources(&[only_tsx], &[], &mut warnings)
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_scan_files_excludes() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("keep.ts"), "export {}").unwrap();
        fs::write(temp_dir.path().join("keep.test.ts"), "export {}").unwrap();

        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(
                &[rule(temp_dir.path())],
                &["**/*.test.ts".to_string()],
                &mut warnings,
            )
            .unwrap();
        assert_eq!(names(&records), vec!["keep"]);
    }

    #[test]
    fn test_scan_sources_deduplicates_first_wins() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("only.ts"), "export {}").unwrap();

        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(
                &[rule(temp_dir.path()), rule(temp_dir.path())],
                &[],
                &mut warnings,
            )
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_scan_directories_requires_index() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("withIndex")).unwrap();
        fs::write(temp_dir.path().join("withIndex/index.ts"), "export {}").unwrap();
        fs::create_dir(temp_dir.path().join("withoutIndex")).unwrap();
        fs::write(temp_dir.path().join("loose.ts"), "export {}").unwrap();

        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(&[dir_rule(temp_dir.path())], &[], &mut warnings)
            .unwrap();

        assert_eq!(names(&records), vec!["withIndex"]);
        assert!(records[0].path.ends_with("withIndex/index.ts"));
        assert_eq!(records[0].extension, ".ts");
    }

    #[test]
    fn test_scan_directories_exclude_substring_semantics() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["keep", "generated-helpers", "helpers"] {
            fs::create_dir(temp_dir.path().join(name)).unwrap();
            fs::write(temp_dir.path().join(name).join("index.ts"), "export {}").unwrap();
        }

        // "**/helpers" strips to "helpers", which is contained in BOTH
        // "helpers" and "generated-helpers". Substring containment, not glob.
        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(
                &[dir_rule(temp_dir.path())],
                &["**/helpers".to_string()],
                &mut warnings,
            )
            .unwrap();
        assert_eq!(names(&records), vec!["keep"]);
    }

    #[test]
    fn test_scan_directories_exclude_strips_inner_glob_token() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        for name in ["helpers", "keep"] {
            fs::create_dir_all(src.join(name)).unwrap();
            fs::write(src.join(name).join("index.ts"), "export {}").unwrap();
        }

        // "src/**/helpers" collapses to "src/helpers"; the "**/" token is
        // dropped wherever it appears, not only at the front.
        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(
                &[dir_rule(&src)],
                &["src/**/helpers".to_string()],
                &mut warnings,
            )
            .unwrap();
        assert_eq!(names(&records), vec!["keep"]);
    }

    #[test]
    fn test_scan_directories_recursive_depth() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("l1/l2/l3")).unwrap();
        fs::write(temp_dir.path().join("l1/index.ts"), "export {}").unwrap();
        fs::write(temp_dir.path().join("l1/l2/index.ts"), "export {}").unwrap();
        fs::write(temp_dir.path().join("l1/l2/l3/index.ts"), "export {}").unwrap();

        let mut shallow = dir_rule(temp_dir.path());
        shallow.recursive = true;
        shallow.max_depth = Some(1);

        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(&[shallow], &[], &mut warnings)
            .unwrap();
        assert_eq!(names(&records), vec!["l1"]);

        let mut two_deep = dir_rule(temp_dir.path());
        two_deep.recursive = true;
        two_deep.max_depth = Some(2);

        let records = scanner()
            .scan_sources(&[two_deep], &[], &mut warnings)
            .unwrap();
        let mut found = names(&records);
        found.sort_unstable();
        assert_eq!(found, vec!["l1", "l2"]);
    }

    #[test]
    fn test_scan_directories_unreadable_warns() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");

        let mut warnings = Vec::new();
        let records = scanner()
            .scan_sources(&[dir_rule(&missing)], &[], &mut warnings)
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Could not scan directory"));
    }

    #[test]
    fn test_validate_file() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.ts");
        fs::write(&good, "export const x = 1;").unwrap();
        let bad = temp_dir.path().join("bad.ts");
        fs::write(&bad, "const hidden = 1;").unwrap();

        let mut warnings = Vec::new();
        let scanner = scanner();
        assert!(scanner.validate_file(&good, &mut warnings));
        assert!(warnings.is_empty());

        assert!(!scanner.validate_file(&bad, &mut warnings));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no exports"));

        let missing = temp_dir.path().join("missing.ts");
        assert!(!scanner.validate_file(&missing, &mut warnings));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./a/b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("a/./b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("a/x/../b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
    }
}
