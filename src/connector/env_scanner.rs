//! Env-URL scanner: a side scanner, independent of the extraction
//! pipeline, that walks a repo for configuration files and pulls out
//! `KEY = URL`-shaped bindings. Consumed by callers that want to
//! cross-check CONFIGURES edges against what the raw config files
//! actually declare — the pipeline's own CONFIGURES pass only
//! ever sees string constants the extractor resolved from source, not
//! `.env`/YAML/TOML/HCL/Dockerfile/shell text, so this fills the gap for
//! anyone auditing the two side by side.

use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

use crate::domain::PipelineError;

/// One `KEY = URL` binding discovered in a non-source configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvUrlBinding {
    pub file_path: String,
    pub key: String,
    pub url: String,
}

const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

/// Keys containing any of these (case-insensitive) are never reported,
/// URL-shaped value or not.
const SENSITIVE_KEY_MARKERS: &[&str] = &["SECRET", "TOKEN", "KEY", "PASSWORD"];

/// Value prefixes that look like a live credential rather than a URL
/// (GitHub, Slack, Stripe token shapes); any value carrying one is
/// dropped even if it otherwise parses as `KEY = URL`.
const SECRET_VALUE_PREFIXES: &[&str] = &[
    "ghp_", "gho_", "ghu_", "ghs_", "ghr_", "github_pat_", "xox", "sk-", "sk_live_", "sk_test_",
    "AKIA",
];

fn is_interesting_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if looks_like_credentials_file(name) {
        return false;
    }
    if name.starts_with(".env") {
        return true;
    }
    if name == "Dockerfile" || name.starts_with("Dockerfile.") {
        return true;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("properties") | Some("yaml") | Some("yml") | Some("toml") | Some("hcl")
        | Some("tf") | Some("sh") | Some("bash") => true,
        _ => false,
    }
}

/// Files matching secret-naming patterns are skipped entirely regardless
/// of extension.
fn looks_like_credentials_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("credentials.") || lower == "credentials"
}

fn is_sensitive_key(key: &str) -> bool {
    let upper = key.to_uppercase();
    SENSITIVE_KEY_MARKERS.iter().any(|marker| upper.contains(marker))
}

fn looks_like_secret_value(value: &str) -> bool {
    SECRET_VALUE_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

fn binding_regex() -> Regex {
    // Covers `.env`/properties/shell `KEY=value`, YAML/HCL/TOML `key: value`
    // or `key = "value"`, and Dockerfile `ENV KEY value` / `ENV KEY=value`.
    Regex::new(
        r#"(?i)^\s*(?:export\s+|ENV\s+)?([A-Za-z_][A-Za-z0-9_.]*)\s*[:=]\s*"?(https?://[^"'\s]+)"?\s*$"#,
    )
        .expect("static regex is valid")
}

/// Walks `repo_root` for the file kinds names, extracting `KEY = URL`
/// bindings. Returns an empty vector (not an error) when nothing matches;
/// a missing directory is the only hard error, since the caller chose the
/// root explicitly.
pub fn scan(repo_root: &Path) -> Result<Vec<EnvUrlBinding>, PipelineError> {
    if !repo_root.exists() {
        return Err(PipelineError::InvalidRoot(repo_root.display().to_string()));
    }
    let re = binding_regex();
    let mut bindings = Vec::new();

    let walker = WalkDir::new(repo_root).into_iter().filter_entry(|entry| {
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_str().unwrap_or("");
                return !EXCLUDED_DIRS.contains(&name);
            }
            true
    });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_interesting_file(path) {
            continue;
        }
        let Ok(text) = std::fs::read_to_string(path) else {
            continue;
        };
        let rel = relative_path(repo_root, path);
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
                continue;
            }
            let Some(caps) = re.captures(trimmed) else {
                continue;
            };
            let key = caps[1].to_string();
            let url = caps[2].trim_matches(|c| c == '"' || c == '\'').to_string();
            if is_sensitive_key(&key) || looks_like_secret_value(&url) {
                continue;
            }
            bindings.push(EnvUrlBinding {
                    file_path: rel.clone(),
                    key,
                    url,
            });
        }
    }

    Ok(bindings)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn finds_url_binding_in_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".env", "DB_URL=https://db.example.com/\nDEBUG=true\n");
        let bindings = scan(dir.path()).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].key, "DB_URL");
        assert_eq!(bindings[0].url, "https://db.example.com/");
    }

    #[test]
    fn skips_sensitive_keys_and_secret_shaped_values() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "config.yaml",
            "api_token: https://looks-like-a-url.example/\nservice_url: https://ok.example/\n",
        );
        write(dir.path(), "secrets.env", "GH_TOKEN=ghp_abcdefghijklmnop\n");
        let bindings = scan(dir.path()).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].key, "service_url");
    }

    #[test]
    fn skips_credentials_files_and_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "credentials.yaml", "url: https://example.com/\n");
        write(dir.path(), "node_modules/pkg/.env", "X=https://example.com/\n");
        let bindings = scan(dir.path()).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn non_url_values_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".env", "NAME=myapp\nPORT=8080\n");
        let bindings = scan(dir.path()).unwrap();
        assert!(bindings.is_empty());
    }
}
