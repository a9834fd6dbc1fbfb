//! Snapshot assembly shared by remote and local acquisition.

use std::path::Path;

use crate::domain::{KeyFilesContent, MissingFiles, RepositoryMetadata, RepositorySnapshot};
use crate::error::Result;
use crate::fs::FileSystem;

/// Well-known files whose content is fetched alongside the listing.
pub const KEY_FILES: &[&str] = &[
    "package.json",
    "README.md",
    "readme.md",
    ".gitignore",
    "LICENSE",
    "CONTRIBUTING.md",
    "requirements.txt",
    "setup.py",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
];

/// Work out which standard project files are absent from a listing.
pub fn detect_missing_files(files: &[String]) -> MissingFiles {
    let lowered: Vec<String> = files.iter().map(|f| f.to_lowercase()).collect();
    MissingFiles {
        readme: !lowered.iter().any(|f| f == "readme.md"),
        gitignore: !files.iter().any(|f| f == ".gitignore"),
        license: !lowered.iter().any(|f| f.starts_with("license")),
        contributing: !lowered.iter().any(|f| f == "contributing.md"),
    }
}

/// Key files that appear verbatim in the listing, in [`KEY_FILES`] order.
pub fn present_key_files(files: &[String]) -> Vec<&'static str> {
    KEY_FILES
        .iter()
        .copied()
        .filter(|key| files.iter().any(|f| f == key))
        .collect()
}

/// Build a snapshot, deriving the missing-file flags from the listing.
pub fn assemble_snapshot(
    files: Vec<String>,
    metadata: RepositoryMetadata,
    key_files_content: KeyFilesContent,
) -> RepositorySnapshot {
    let missing_files = detect_missing_files(&files);
    RepositorySnapshot {
        files,
        metadata,
        key_files_content,
        missing_files,
    }
}

/// Build a snapshot of a local checkout rooted at `root`.
///
/// The metadata carries only the directory name. Unreadable key files are
/// skipped with a warning and empty ones are left out.
pub fn load_local_snapshot(fs: &dyn FileSystem, root: &Path) -> Result<RepositorySnapshot> {
    let files = fs.list_files(root)?;
    let mut key_files_content = KeyFilesContent::new();
    for key in present_key_files(&files) {
        match fs.read_to_string(&root.join(key)) {
            Ok(content) if !content.is_empty() => {
                key_files_content.insert(key.to_string(), content);
            }
            Ok(_) => log::debug!("skipping empty {key} in {}", root.display()),
            Err(err) => log::warn!("skipping {key} in {}: {err}", root.display()),
        }
    }

    let name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    log::debug!("loaded {} files from {}", files.len(), root.display());

    Ok(assemble_snapshot(
        files,
        RepositoryMetadata::named(name),
        key_files_content,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoMedicError;
    use crate::fs::MockFileSystem;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn missing_files_use_case_rules() {
        let missing = detect_missing_files(&paths(&[
            "docs/readme.md",
            "License.txt",
            "Contributing.md",
            "sub/.gitignore",
        ]));
        assert!(missing.readme);
        assert!(missing.gitignore);
        assert!(!missing.license);
        assert!(!missing.contributing);

        let missing = detect_missing_files(&paths(&["ReadMe.md", ".gitignore"]));
        assert!(!missing.readme);
        assert!(!missing.gitignore);
        assert!(missing.license);
        assert!(missing.contributing);
    }

    #[test]
    fn empty_listing_misses_everything() {
        assert_eq!(detect_missing_files(&[]), MissingFiles::all());
    }

    #[test]
    fn present_key_files_keep_table_order() {
        let files = paths(&["go.mod", "src/main.go", "README.md", "docs/LICENSE"]);
        assert_eq!(present_key_files(&files), vec!["README.md", "go.mod"]);
    }

    #[test]
    fn local_snapshot_reads_key_files_and_names_directory() {
        let root = PathBuf::from("/work/demo-repo");
        let mut fs = MockFileSystem::new();
        fs.expect_list_files()
            .with(eq(root.clone()))
            .returning(|_| Ok(paths(&["README.md", "package.json", "src/index.ts"])));
        fs.expect_read_to_string()
            .with(eq(PathBuf::from("/work/demo-repo/package.json")))
            .returning(|_| Ok("{\"name\":\"demo\"}".to_string()));
        fs.expect_read_to_string()
            .with(eq(PathBuf::from("/work/demo-repo/README.md")))
            .returning(|_| {
                Err(RepoMedicError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                )))
            });

        let snapshot = load_local_snapshot(&fs, &root).expect("snapshot");
        assert_eq!(snapshot.metadata.name, "demo-repo");
        assert_eq!(snapshot.files.len(), 3);
        assert_eq!(snapshot.package_json(), Some("{\"name\":\"demo\"}"));
        assert!(snapshot.readme().is_none());
        assert!(!snapshot.missing_files.readme);
        assert!(snapshot.missing_files.license);
    }

    #[test]
    fn local_snapshot_skips_empty_key_files() {
        let root = PathBuf::from("/work/demo");
        let mut fs = MockFileSystem::new();
        fs.expect_list_files()
            .with(eq(root.clone()))
            .returning(|_| Ok(paths(&["README.md", "LICENSE"])));
        fs.expect_read_to_string()
            .with(eq(PathBuf::from("/work/demo/README.md")))
            .returning(|_| Ok(String::new()));
        fs.expect_read_to_string()
            .with(eq(PathBuf::from("/work/demo/LICENSE")))
            .returning(|_| Ok("MIT".to_string()));

        let snapshot = load_local_snapshot(&fs, &root).expect("snapshot");
        assert!(!snapshot.key_files_content.contains_key("README.md"));
        assert_eq!(
            snapshot.key_files_content.get("LICENSE").map(String::as_str),
            Some("MIT")
        );
        assert!(!snapshot.missing_files.readme);
    }

    #[test]
    fn local_snapshot_propagates_listing_errors() {
        let mut fs = MockFileSystem::new();
        fs.expect_list_files().returning(|_| {
            Err(RepoMedicError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "gone",
            )))
        });
        let result = load_local_snapshot(&fs, Path::new("/missing"));
        assert!(matches!(result, Err(RepoMedicError::Io(_))));
    }
}
