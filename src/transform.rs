use inflector::string::pluralize::to_plural;
use inflector::string::singularize::to_singular;

/// Default prefixes stripped by `trimPrefix` when no parameter is given.
const DEFAULT_TRIM_PREFIXES: &str = "warehouse-,ops-";

/// Applies a `|`-separated transform chain, left to right, starting from the
/// variable's raw bound value.
pub fn apply_chain(value: &str, chain: &str, warnings: &mut Vec<String>) -> String {
    let mut result = value.to_string();
    for transform in chain.split('|') {
        result = apply_transform(&result, transform.trim(), warnings);
    }
    result
}

/// Applies a single transform. `spec` is `name` or `name:params`; everything
/// after the first colon belongs to the parameters, colons included.
///
/// Unknown names and missing required parameters degrade to the unchanged
/// value with a warning, never an error.
pub fn apply_transform(value: &str, spec: &str, warnings: &mut Vec<String>) -> String {
    let (name, params) = match spec.split_once(':') {
        Some((name, params)) => (name, Some(params)),
        None => (spec, None),
    };
    let params = params.filter(|p| !p.is_empty());

    match name.to_lowercase().as_str() {
        "raw" => value.to_string(),
        "camel" => to_camel_case(value),
        "kebab" => to_kebab_case(value),
        "pascal" => to_pascal_case(value),
        "singular" => to_singular(value),
        "plural" => to_plural(value),
        "trimprefix" | "trim-prefix" => trim_prefix(value, params),
        "trimsuffix" | "trim-suffix" => trim_suffix(value, params, warnings),
        "addprefix" | "add-prefix" => add_prefix(value, params, warnings),
        "addsuffix" | "add-suffix" => add_suffix(value, params, warnings),
        "replace" => replace_text(value, params, warnings),
        "uppercase" => value.to_uppercase(),
        "lowercase" => value.to_lowercase(),
        "capitalize" => capitalize(value),
        "uncapitalize" => uncapitalize(value),
        other => {
            warnings.push(format!(
                "Unknown transformation: {other}. Available: raw, camel, kebab, pascal, singular, plural, trimPrefix, trimSuffix, addPrefix, addSuffix, replace, uppercase, lowercase, capitalize, uncapitalize"
            ));
            value.to_string()
        }
    }
}

/// Word-boundary split on `-`, `_`, `.` and space; each word capitalized and
/// joined without a separator.
pub fn to_pascal_case(value: &str) -> String {
    value.split(['-', '_', '.', ' ']).map(capitalize).collect()
}

pub fn to_camel_case(value: &str) -> String {
    uncapitalize(&to_pascal_case(value))
}

/// Inserts `-` at lowercase-to-uppercase transitions, collapses whitespace
/// and underscore runs to a single `-`, and lower-cases the result.
pub fn to_kebab_case(value: &str) -> String {
    let mut dashed = String::with_capacity(value.len() + 4);
    let mut prev: Option<char> = None;
    for c in value.chars() {
        if let Some(p) = prev
            && p.is_ascii_lowercase()
            && c.is_ascii_uppercase()
        {
            dashed.push('-');
        }
        dashed.push(c);
        prev = Some(c);
    }

    let mut collapsed = String::with_capacity(dashed.len());
    let mut in_run = false;
    for c in dashed.chars() {
        if c.is_whitespace() || c == '_' {
            if !in_run {
                collapsed.push('-');
            }
            in_run = true;
        } else {
            in_run = false;
            collapsed.push(c);
        }
    }

    collapsed.to_lowercase()
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn uncapitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn trim_prefix(value: &str, params: Option<&str>) -> String {
    let list = params.unwrap_or(DEFAULT_TRIM_PREFIXES);
    for prefix in list.split(',').map(str::trim) {
        if let Some(stripped) = value.strip_prefix(prefix) {
            return stripped.to_string();
        }
    }
    value.to_string()
}

fn trim_suffix(value: &str, params: Option<&str>, warnings: &mut Vec<String>) -> String {
    // No default suffix list; the parameter is mandatory.
    let Some(params) = params else {
        warnings.push(
            "trimSuffix requires suffixes parameter, e.g., trimSuffix:Service,Manager".to_string(),
        );
        return value.to_string();
    };
    for suffix in params.split(',').map(str::trim) {
        if !suffix.is_empty()
            && let Some(stripped) = value.strip_suffix(suffix)
        {
            return stripped.to_string();
        }
    }
    value.to_string()
}

fn add_prefix(value: &str, params: Option<&str>, warnings: &mut Vec<String>) -> String {
    let Some(prefix) = params else {
        warnings.push("addPrefix requires prefix parameter, e.g., addPrefix:I".to_string());
        return value.to_string();
    };
    format!("{prefix}{value}")
}

fn add_suffix(value: &str, params: Option<&str>, warnings: &mut Vec<String>) -> String {
    let Some(suffix) = params else {
        warnings.push("addSuffix requires suffix parameter, e.g., addSuffix:Factory".to_string());
        return value.to_string();
    };
    format!("{value}{suffix}")
}

/// `;`-separated `search,replace` pairs, applied in order as literal
/// substring replacement of every occurrence.
fn replace_text(value: &str, params: Option<&str>, warnings: &mut Vec<String>) -> String {
    let Some(params) = params else {
        warnings.push(
            "replace requires parameters, e.g., replace:old,new or replace:pattern1,replacement1;pattern2,replacement2"
                .to_string(),
        );
        return value.to_string();
    };

    let mut result = value.to_string();
    for pair in params.split(';') {
        let parts: Vec<&str> = pair.split(',').map(str::trim).collect();
        let search = parts.first().copied().unwrap_or("");
        if parts.len() >= 2 && !search.is_empty() {
            result = result.replace(search, parts[1]);
        }
    }
    result
}
