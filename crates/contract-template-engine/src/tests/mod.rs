use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary templates directory
pub fn create_test_templates_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test template file with content
pub fn create_test_file(templates_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = templates_dir.path().join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}
