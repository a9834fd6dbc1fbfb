//! Point-deduction health scoring over a repository file listing.

use crate::domain::{
    KeyFilesContent, MissingFiles, Recommendation, RepositoryMetadata, RepositorySnapshot,
    ScoreReport, Scores, readme_content,
};

/// READMEs shorter than this (in UTF-16 code units) are flagged as too short.
pub const MIN_README_LENGTH: usize = 500;

const SOURCE_DIR_MIN_FILES: usize = 10;

/// Issue reported when no README exists.
pub const ISSUE_MISSING_README: &str = "Missing README.md - No project documentation";
/// Issue reported when the README is shorter than [`MIN_README_LENGTH`].
pub const ISSUE_SHORT_README: &str = "README.md is too short - Needs more documentation";
/// Issue reported when no `.gitignore` exists.
pub const ISSUE_MISSING_GITIGNORE: &str =
    "Missing .gitignore - May have unnecessary files committed";
/// Issue reported when no LICENSE exists.
pub const ISSUE_MISSING_LICENSE: &str = "Missing LICENSE - Project licensing unclear";
/// Issue reported when no CONTRIBUTING.md exists.
pub const ISSUE_MISSING_CONTRIBUTING: &str =
    "No CONTRIBUTING.md - Could help attract contributors";
/// Issue reported when `node_modules/` is committed.
pub const ISSUE_VENDORED_DEPENDENCIES: &str = "node_modules committed to repository";
/// Issue reported when environment files are committed.
pub const ISSUE_COMMITTED_SECRETS: &str = "Environment files may be committed - Security risk";
/// Issue reported when build output directories are committed.
pub const ISSUE_BUILD_ARTIFACTS: &str = "Build artifacts committed to repository";
/// Issue reported when code is not organised under a source directory.
pub const ISSUE_NO_SOURCE_DIR: &str = "Consider organizing code into src/ or lib/ folders";
/// Issue reported when no test files are found.
pub const ISSUE_NO_TESTS: &str = "No tests found - Consider adding test coverage";

/// Score a repository snapshot.
pub fn score_snapshot(snapshot: &RepositorySnapshot) -> ScoreReport {
    score_repository(
        &snapshot.files,
        &snapshot.metadata,
        &snapshot.missing_files,
        &snapshot.key_files_content,
    )
}

/// Compute documentation and structure scores, issues, and recommendations.
///
/// Never fails: absent data is a signal, not an error. Path checks are plain
/// substring/prefix matches, so `latest.txt` counts as a test file.
pub fn score_repository(
    files: &[String],
    _metadata: &RepositoryMetadata,
    missing: &MissingFiles,
    key_files: &KeyFilesContent,
) -> ScoreReport {
    let mut issues = Vec::new();
    let mut documentation: i32 = 100;
    let mut structure: i32 = 100;

    if missing.readme {
        issues.push(ISSUE_MISSING_README.to_string());
        documentation -= 30;
    } else if readme_is_short(key_files) {
        issues.push(ISSUE_SHORT_README.to_string());
        documentation -= 15;
    }

    if missing.gitignore {
        issues.push(ISSUE_MISSING_GITIGNORE.to_string());
        structure -= 20;
    }

    if missing.license {
        issues.push(ISSUE_MISSING_LICENSE.to_string());
        documentation -= 10;
    }

    if missing.contributing {
        issues.push(ISSUE_MISSING_CONTRIBUTING.to_string());
        documentation -= 5;
    }

    if files.iter().any(|f| f.contains("node_modules/")) {
        issues.push(ISSUE_VENDORED_DEPENDENCIES.to_string());
        structure -= 30;
    }

    if files.iter().any(|f| f == ".env" || f.contains(".env.local")) {
        issues.push(ISSUE_COMMITTED_SECRETS.to_string());
        structure -= 25;
    }

    if files.iter().any(|f| is_build_artifact(f)) {
        issues.push(ISSUE_BUILD_ARTIFACTS.to_string());
        structure -= 15;
    }

    let has_source_dir = files.iter().any(|f| is_in_source_dir(f));
    if !has_source_dir && files.len() > SOURCE_DIR_MIN_FILES {
        issues.push(ISSUE_NO_SOURCE_DIR.to_string());
        structure -= 10;
    }

    if !has_test_files(files) {
        issues.push(ISSUE_NO_TESTS.to_string());
        structure -= 10;
    }

    let documentation = documentation.max(0) as u8;
    let structure = structure.max(0) as u8;

    ScoreReport {
        scores: Scores {
            overall: rounded_mean(documentation, structure),
            documentation,
            structure,
        },
        issues,
        recommendations: recommendations_for(missing),
    }
}

/// Recommended generators for the missing standard files, in fixed order.
pub fn recommendations_for(missing: &MissingFiles) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    if missing.readme {
        recommendations.push(Recommendation::GenerateReadme);
    }
    if missing.gitignore {
        recommendations.push(Recommendation::GenerateGitignore);
    }
    if missing.license {
        recommendations.push(Recommendation::GenerateLicense);
    }
    if missing.contributing {
        recommendations.push(Recommendation::GenerateContributing);
    }
    recommendations
}

/// Whether any path looks like a test file (substring match).
pub fn has_test_files(files: &[String]) -> bool {
    files
        .iter()
        .any(|f| f.contains("test") || f.contains("spec") || f.contains("__tests__"))
}

fn readme_is_short(key_files: &KeyFilesContent) -> bool {
    match readme_content(key_files) {
        Some(content) if !content.is_empty() => {
            content.encode_utf16().count() < MIN_README_LENGTH
        }
        _ => false,
    }
}

fn is_build_artifact(path: &str) -> bool {
    path.starts_with("dist/") || path.starts_with("build/") || path.starts_with(".next/")
}

fn is_in_source_dir(path: &str) -> bool {
    path.starts_with("src/") || path.starts_with("lib/") || path.starts_with("app/")
}

// Half rounds up.
fn rounded_mean(a: u8, b: u8) -> u8 {
    ((u16::from(a) + u16::from(b) + 1) / 2) as u8
}
