use std::path::Path;

/// Collects the top-level source files of a workspace root. Deliberately
/// non-recursive: only direct children with a .ts/.tsx extension seed the
/// project, deeper files join it as they are opened.
pub fn collect_root_files(directory: &Path) -> std::io::Result<Vec<String>> {
    let mut root_files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.ends_with(".ts") || file_name.ends_with(".tsx") {
            root_files.push(file_name.to_string());
        }
    }
    root_files.sort();
    Ok(root_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn collects_only_top_level_source_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("add.ts"), "export const a = 1;").unwrap();
        std::fs::write(dir.path().join("view.tsx"), "export const v = 1;").unwrap();
        std::fs::write(dir.path().join("readme.md"), "# nope").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/nested.ts"), "").unwrap();

        let files = collect_root_files(dir.path()).unwrap();
        assert_eq!(files, vec!["add.ts".to_string(), "view.tsx".to_string()]);
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = TempDir::new().unwrap();
        assert!(collect_root_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        assert!(collect_root_files(Path::new("/no/such/dir")).is_err());
    }
}
