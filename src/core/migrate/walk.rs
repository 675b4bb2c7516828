use glob_match::glob_match;
use std::path::{Path, PathBuf};

/// Directories to always skip at any depth (VCS metadata).
const ALWAYS_SKIP_DIRS: &[&str] = &[".git", ".svn", ".hg"];

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Extensions without the dot; compared case-sensitively.
    pub extensions: Vec<String>,
    /// Globs matched against `/`-separated root-relative paths.
    pub exclude: Vec<String>,
}

impl WalkOptions {
    fn wants_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|glob| glob_match(glob, relative))
    }
}

/// Collect files under `root` to rewrite, in sorted order.
///
/// A file root is returned on its own when its extension matches.
pub fn walk_files(root: &Path, options: &WalkOptions) -> Vec<PathBuf> {
    if root.is_file() {
        return if options.wants_extension(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut files = Vec::new();
    walk_recursive(root, root, options, &mut files);
    files
}

fn walk_recursive(dir: &Path, root: &Path, options: &WalkOptions, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let relative = relative_path(root, &path);

        // Symlinked directories are not descended.
        if file_type.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if ALWAYS_SKIP_DIRS.contains(&name.as_str()) || options.is_excluded(&relative) {
                continue;
            }
            walk_recursive(&path, root, options, files);
        } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
            && options.wants_extension(&path)
            && !options.is_excluded(&relative)
        {
            files.push(path);
        }
    }
}

/// `path` relative to `root` with `/` separators; the path itself when it is the root.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if relative.as_os_str().is_empty() {
        return path.to_string_lossy().to_string();
    }

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(extensions: &[&str], exclude: &[&str]) -> WalkOptions {
        WalkOptions {
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn relative_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|f| relative_path(root, f)).collect()
    }

    #[test]
    fn walks_sorted_and_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/web")).unwrap();
        fs::write(root.join("src/web/b.C"), "").unwrap();
        fs::write(root.join("src/web/a.h"), "").unwrap();
        fs::write(root.join("src/notes.txt"), "").unwrap();
        fs::write(root.join("main.cpp"), "").unwrap();

        let files = walk_files(root, &options(&["cpp", "C", "h"], &[]));
        assert_eq!(
            relative_names(root, &files),
            vec!["main.cpp", "src/web/a.h", "src/web/b.C"]
        );
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("upper.C"), "").unwrap();
        fs::write(dir.path().join("lower.c"), "").unwrap();

        let files = walk_files(dir.path(), &options(&["C"], &[]));
        assert_eq!(relative_names(dir.path(), &files), vec!["upper.C"]);
    }

    #[test]
    fn vcs_dirs_and_excludes_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("third_party/lib")).unwrap();
        fs::write(root.join(".git/hook.h"), "").unwrap();
        fs::write(root.join("third_party/lib/x.h"), "").unwrap();
        fs::write(root.join("keep.h"), "").unwrap();
        fs::write(root.join("generated.h"), "").unwrap();

        let files = walk_files(root, &options(&["h"], &["third_party", "generated.h"]));
        assert_eq!(relative_names(root, &files), vec!["keep.h"]);
    }

    #[test]
    fn double_star_exclude_matches_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("build/gen")).unwrap();
        fs::write(root.join("build/gen/out.h"), "").unwrap();
        fs::write(root.join("in.h"), "").unwrap();

        let files = walk_files(root, &options(&["h"], &["build/**"]));
        assert_eq!(relative_names(root, &files), vec!["in.h"]);
    }

    #[test]
    fn file_root_is_returned_when_extension_matches() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.cpp");
        fs::write(&file, "").unwrap();

        assert_eq!(walk_files(&file, &options(&["cpp"], &[])), vec![file.clone()]);
        assert!(walk_files(&file, &options(&["h"], &[])).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_walked() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/a.txt"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real/a.txt"), root.join("link.cpp")).unwrap();
        std::os::unix::fs::symlink(root.join("missing.txt"), root.join("dangling.cpp")).unwrap();

        let files = walk_files(root, &options(&["cpp"], &[]));
        assert_eq!(relative_names(root, &files), vec!["link.cpp"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.h"), "").unwrap();
        std::os::unix::fs::symlink(root, root.join("src/loop")).unwrap();

        let files = walk_files(root, &options(&["h"], &[]));
        assert_eq!(relative_names(root, &files), vec!["src/a.h"]);
    }

    #[test]
    fn relative_path_of_root_file_is_the_path() {
        let path = Path::new("src/only.cpp");
        assert_eq!(relative_path(path, path), "src/only.cpp");
    }
}
