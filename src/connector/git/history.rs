//! Git-history coupling: shells out to `git log`, groups changed
//! files per commit, and scores file pairs that tend to change together.
//! Pure post-processing over `git`'s own output — no libgit2 binding, the
//! same shell-out approach the git-diff surface uses.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::application::ports::HistoryAnalyser;
use crate::application::PipelineConfig;
use crate::domain::{CoupledPair, PipelineError};

const EXCLUDED_DIRS: &[&str] = &[".git/", "node_modules/", "vendor/", "__pycache__/", ".cache/"];
const EXCLUDED_BASENAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
    "composer.lock",
    "Gemfile.lock",
    "Pipfile.lock",
];
const EXCLUDED_SUFFIXES: &[&str] = &[
    ".lock", ".sum", ".min.js", ".min.css", ".map", ".wasm", ".png", ".jpg", ".gif", ".ico", ".svg",
];

/// Shells out to `git log` and scores co-changing file pairs. Every tunable
/// (window, timeout, thresholds) comes from [`PipelineConfig`] rather than
/// being baked in, so a run can be repeated with different sensitivity
/// without recompiling.
#[derive(Debug, Default)]
pub struct GitHistoryAnalyser;

impl GitHistoryAnalyser {
    pub fn new() -> Self {
        Self
    }
}

impl HistoryAnalyser for GitHistoryAnalyser {
    fn analyse(&self, repo_root: &Path, config: &PipelineConfig) -> Result<Vec<CoupledPair>, PipelineError> {
        analyse(repo_root, config)
    }
}

/// Runs `git log` over `repo_root` and returns the top coupled file pairs,
/// or `Ok(vec![])` if `repo_root` isn't a git repository (a missing `.git`
/// directory is not treated as an error — plenty of indexed repos aren't
/// under version control at all).
pub fn analyse(repo_root: &Path, config: &PipelineConfig) -> Result<Vec<CoupledPair>, PipelineError> {
    if !repo_root.join(".git").exists() {
        return Ok(Vec::new());
    }

    let timeout = Duration::from_secs(config.git_history_timeout_secs);
    let output = run_git_log(repo_root, &config.git_history_since, timeout)?;
    let commits = parse_commits(&output);
    score_pairs(commits, config)
}

/// Spawns `git log` and polls it with [`std::process::Child::try_wait`]
/// rather than the blocking `Command::output`, so a hung process (or a
/// misconfigured repo with an enormous history) can be killed after
/// `timeout` instead of hanging the whole run.
fn run_git_log(repo_root: &Path, since: &str, timeout: Duration) -> Result<String, PipelineError> {
    let mut child = match Command::new("git")
        .arg("log")
        .arg("--name-only")
        .arg("--pretty=format:COMMIT:%H")
        .arg(format!("--since={since}"))
        .current_dir(repo_root)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            warn!(error = %e, "git not available, skipping history coupling");
            return Ok(String::new());
        }
    };

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let mut stdout = String::new();
                if let Some(mut out) = child.stdout.take() {
                    let _ = out.read_to_string(&mut stdout);
                }
                if status.success() {
                    return Ok(stdout);
                }
                let mut stderr = String::new();
                if let Some(mut err) = child.stderr.take() {
                    let _ = err.read_to_string(&mut stderr);
                }
                warn!(status = ?status.code(), stderr = %stderr, "git log failed, skipping history coupling");
                return Ok(String::new());
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(timeout_secs = timeout.as_secs(), "git log timed out, skipping history coupling");
                    return Ok(String::new());
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                warn!(error = %e, "failed to poll git log, skipping history coupling");
                return Ok(String::new());
            }
        }
    }
}

fn parse_commits(output: &str) -> Vec<Vec<String>> {
    let mut commits = Vec::new();
    let mut current: Option<Vec<String>> = None;
    for line in output.lines() {
        if let Some(_hash) = line.strip_prefix("COMMIT:") {
            if let Some(files) = current.take() {
                commits.push(files);
            }
            current = Some(Vec::new());
        } else if !line.trim().is_empty() {
            if is_trackable(line) {
                if let Some(files) = current.as_mut() {
                    files.push(line.to_string());
                }
            }
        }
    }
    if let Some(files) = current.take() {
        commits.push(files);
    }
    commits
}

fn is_trackable(path: &str) -> bool {
    if EXCLUDED_DIRS.iter().any(|d| path.starts_with(d) || path.contains(&format!("/{d}"))) {
        return false;
    }
    let basename = path.rsplit('/').next().unwrap_or(path);
    if EXCLUDED_BASENAMES.contains(&basename) {
        return false;
    }
    if EXCLUDED_SUFFIXES.iter().any(|s| path.ends_with(s)) {
        return false;
    }
    true
}

fn score_pairs(commits: Vec<Vec<String>>, config: &PipelineConfig) -> Result<Vec<CoupledPair>, PipelineError> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    let mut co_changes: HashMap<(String, String), u32> = HashMap::new();

    for files in commits {
        if files.len() > config.max_commit_files {
            continue;
        }
        let unique: HashSet<&String> = files.iter().collect();
        for f in &unique {
            *totals.entry((*f).clone()).or_insert(0) += 1;
        }
        let mut sorted: Vec<&String> = unique.into_iter().collect();
        sorted.sort();
        for i in 0..sorted.len() {
            for j in (i + 1)..sorted.len() {
                let key = (sorted[i].clone(), sorted[j].clone());
                *co_changes.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<CoupledPair> = Vec::new();
    for ((a, b), co_change) in co_changes {
        if co_change < config.coupling_min_co_change {
            continue;
        }
        let total_a = *totals.get(&a).unwrap_or(&0);
        let total_b = *totals.get(&b).unwrap_or(&0);
        let denom = total_a.min(total_b);
        if denom == 0 {
            continue;
        }
        let score = co_change as f64 / denom as f64;
        if score < config.coupling_min_score {
            continue;
        }
        pairs.push(CoupledPair {
                file_a: a,
                file_b: b,
                co_change_count: co_change,
                total_changes_a: total_a,
                total_changes_b: total_b,
                coupling_score: score,
        });
    }

    pairs.sort_by(|a, b| b.coupling_score.partial_cmp(&a.coupling_score).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(config.coupling_top_n);
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_lockfiles_and_vendor_paths() {
        assert!(!is_trackable("Cargo.lock"));
        assert!(!is_trackable("vendor/pkg/mod.go"));
        assert!(!is_trackable("dist/app.min.js"));
        assert!(is_trackable("src/main.rs"));
    }

    #[test]
    fn commits_over_file_cap_are_excluded_from_scoring() {
        let huge_commit: Vec<String> = (0..25).map(|i| format!("file{i}.rs")).collect();
        let pairs = score_pairs(vec![huge_commit], &PipelineConfig::default()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn pair_below_min_co_change_is_dropped() {
        let commits = vec![
            vec!["a.rs".to_string(), "b.rs".to_string()],
            vec!["a.rs".to_string(), "b.rs".to_string()],
        ];
        let pairs = score_pairs(commits, &PipelineConfig::default()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn qualifying_pair_is_scored_and_capped_at_top_n() {
        let mut commits = Vec::new();
        for _ in 0..3 {
            commits.push(vec!["a.rs".to_string(), "b.rs".to_string()]);
        }
        let pairs = score_pairs(commits, &PipelineConfig::default()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].co_change_count, 3);
        assert!((pairs[0].coupling_score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_commit_header_and_file_list() {
        let output = "COMMIT:abc123\nsrc/a.rs\nsrc/b.rs\n\nCOMMIT:def456\nsrc/a.rs\n";
        let commits = parse_commits(output);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0], vec!["src/a.rs".to_string(), "src/b.rs".to_string()]);
        assert_eq!(commits[1], vec!["src/a.rs".to_string()]);
    }

    #[test]
    fn non_git_directory_yields_no_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let pairs = analyse(dir.path(), &PipelineConfig::default()).unwrap();
        assert!(pairs.is_empty());
    }
}
