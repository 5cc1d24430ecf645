use crate::models::TemplateFile;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid templates directory: {0}")]
    InvalidTemplatesDir(String),
    #[error("Path is outside the templates directory: {0}")]
    OutsideRoot(PathBuf),
}

/// Read a stored template and return its content
pub fn read_template(
    relative_path: &RelativePath,
    templates_root: &Path,
) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(templates_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write a stored template, creating parent directories
pub fn write_template(
    relative_path: &RelativePath,
    templates_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(templates_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)?;
    log::debug!("Wrote {} bytes to {}", content.len(), absolute_path.display());
    Ok(())
}

/// Scan for .html/.htm templates in the templates directory
pub fn scan_template_files(templates_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_templates_dir(templates_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(templates_root, &mut files)?;
    files.sort();
    Ok(files)
}

/// Scan and describe every template relative to the templates directory
pub fn list_templates(templates_root: &Path) -> Result<Vec<TemplateFile>, IoError> {
    scan_template_files(templates_root)?
        .into_iter()
        .map(|path| {
            let relative = path
                .strip_prefix(templates_root)
                .map_err(|_| IoError::OutsideRoot(path.clone()))?;
            RelativePathBuf::from_path(relative)
                .map(TemplateFile::new)
                .map_err(|_| IoError::OutsideRoot(path.clone()))
        })
        .collect()
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && (ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_templates_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidTemplatesDir(format!(
            "{} does not exist or is not a directory",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_templates_dir};

    #[test]
    fn test_scan_finds_html_templates() {
        let dir = create_test_templates_dir();
        create_test_file(&dir, "lease.html", "<p>{{ tenant.name }}</p>");
        create_test_file(&dir, "receipt.htm", "<p>{{ amount | currency }}</p>");

        let files = scan_template_files(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.file_name().unwrap() == "lease.html"));
        assert!(files.iter().any(|f| f.file_name().unwrap() == "receipt.htm"));
    }

    #[test]
    fn test_scan_nested_directories_sorted() {
        let dir = create_test_templates_dir();
        create_test_file(&dir, "residential/b.html", "b");
        create_test_file(&dir, "commercial/a.html", "a");
        create_test_file(&dir, "root.HTML", "r");

        let files = scan_template_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("commercial/a.html"),
                PathBuf::from("residential/b.html"),
                PathBuf::from("root.HTML"),
            ]
        );
    }

    #[test]
    fn test_ignore_non_template_files() {
        let dir = create_test_templates_dir();
        create_test_file(&dir, "lease.html", "<p></p>");
        create_test_file(&dir, "logo.png", "fake image data");
        create_test_file(&dir, "README.md", "# Templates");

        let files = scan_template_files(dir.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "lease.html");
    }

    #[test]
    fn test_handle_invalid_templates_directory() {
        let result = scan_template_files(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidTemplatesDir(_))));
        assert!(result.unwrap_err().to_string().contains("templates directory"));
    }

    #[test]
    fn test_list_templates_relative_names() {
        let dir = create_test_templates_dir();
        create_test_file(&dir, "residential/lease.html", "x");

        let templates = list_templates(dir.path()).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].relative_path().as_str(), "residential/lease.html");
        assert_eq!(templates[0].display_name(), "lease");
    }

    #[test]
    fn test_read_template_not_found() {
        let dir = create_test_templates_dir();
        let result = read_template(RelativePath::new("missing.html"), dir.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_then_read_creates_parent_directories() {
        let dir = create_test_templates_dir();
        let relative_path = RelativePath::new("residential/2024/lease.html");
        let content = "<!DOCTYPE html><html><body>{{ tenant.name }}</body></html>";

        write_template(relative_path, dir.path(), content).unwrap();

        assert_eq!(read_template(relative_path, dir.path()).unwrap(), content);
        assert!(dir.path().join("residential").join("2024").is_dir());
    }

    #[test]
    fn test_write_overwrites_existing() {
        let dir = create_test_templates_dir();
        create_test_file(&dir, "lease.html", "<p>old</p>");

        let relative_path = RelativePath::new("lease.html");
        write_template(relative_path, dir.path(), "<p>new</p>").unwrap();

        assert_eq!(read_template(relative_path, dir.path()).unwrap(), "<p>new</p>");
    }
}
