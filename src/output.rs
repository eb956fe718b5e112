use crate::config::OutputMode;
use crate::error::Result;
use crate::template::GenerationResult;
use std::fs;
use std::io;
use std::path::Path;

/// Markers delimiting the generated block in `partial-replace` mode.
pub const START_MARKER: &str = "// AUTO-GENERATED EXPORTS - START";
pub const END_MARKER: &str = "// AUTO-GENERATED EXPORTS - END";

/// Persists a generation result, creating parent directories as needed.
///
/// # Errors
///
/// Returns `BarrelError::Io` for filesystem failures.
pub fn write_output(result: &GenerationResult, mode: OutputMode) -> Result<()> {
    if let Some(parent) = result.output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let content = match mode {
        OutputMode::Replace => result.content.clone(),
        OutputMode::PartialReplace => merge_partial(&result.output, &result.content)?,
    };

    fs::write(&result.output, content)?;
    Ok(())
}

/// Splices `body` between the generated-block markers of the existing file,
/// keeping everything outside the block. A missing file or missing markers
/// produce a fresh marker block (appended to any existing content).
pub fn merge_partial(output: &Path, body: &str) -> Result<String> {
    let block = format!("{START_MARKER}\n\n{}\n{END_MARKER}", body.trim_end());

    let existing = match fs::read_to_string(output) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(format!("{block}\n")),
        Err(e) => return Err(e.into()),
    };

    if let Some(start) = existing.find(START_MARKER)
        && let Some(end) = existing[start..]
            .find(END_MARKER)
            .map(|offset| start + offset + END_MARKER.len())
    {
        let mut merged = String::with_capacity(existing.len() + block.len());
        merged.push_str(&existing[..start]);
        merged.push_str(&block);
        merged.push_str(&existing[end..]);
        Ok(merged)
    } else {
        let mut merged = existing;
        if !merged.is_empty() && !merged.ends_with('\n') {
            merged.push('\n');
        }
        merged.push_str(&block);
        merged.push('\n');
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result_for(output: &Path, content: &str) -> GenerationResult {
        GenerationResult {
            name: "test".to_string(),
            output: output.to_path_buf(),
            content: content.to_string(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_write_replace_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("deep/nested/index.ts");

        write_output(
            &result_for(&output, "export * from './a.js'\n"),
            OutputMode::Replace,
        )
        .unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "export * from './a.js'\n"
        );
    }

    #[test]
    fn test_merge_partial_preserves_surrounding_content() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("index.ts");
        fs::write(
            &output,
            format!(
                "import {{ config }} from '../config';\n\n{START_MARKER}\n\nexport * from './Old'\n{END_MARKER}\n\nexport class Manager {{}}\n"
            ),
        )
        .unwrap();

        write_output(
            &result_for(&output, "export * from './Auth'\nexport * from './User'\n"),
            OutputMode::PartialReplace,
        )
        .unwrap();

        let merged = fs::read_to_string(&output).unwrap();
        assert!(merged.starts_with("import { config } from '../config';"));
        assert!(merged.contains("export * from './Auth'\nexport * from './User'"));
        assert!(!merged.contains("./Old"));
        assert!(merged.ends_with("export class Manager {}\n"));
    }

    #[test]
    fn test_merge_partial_missing_file_creates_block() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("index.ts");

        let merged = merge_partial(&output, "export * from './A'\n").unwrap();
        assert_eq!(
            merged,
            format!("{START_MARKER}\n\nexport * from './A'\n{END_MARKER}\n")
        );
    }

    #[test]
    fn test_merge_partial_missing_markers_appends() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("index.ts");
        fs::write(&output, "// hand-written header\n").unwrap();

        let merged = merge_partial(&output, "export * from './A'\n").unwrap();
        assert!(merged.starts_with("// hand-written header\n"));
        assert!(merged.contains(START_MARKER));
        assert!(merged.ends_with(&format!("{END_MARKER}\n")));
    }

    #[test]
    fn test_merge_partial_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("index.ts");
        let body = "export * from './A'\n";

        let first = merge_partial(&output, body).unwrap();
        fs::write(&output, &first).unwrap();
        let second = merge_partial(&output, body).unwrap();
        assert_eq!(first, second);
    }
}
