use relative_path::{RelativePath, RelativePathBuf};

const EXTENSIONS: [&str; 2] = [".html", ".htm"];

/// A stored template with a relative path and display-friendly name
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFile {
    relative_path: RelativePathBuf,
    display_name: String,
    display_path: String,
}

impl TemplateFile {
    /// Create a new TemplateFile from a relative path
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let display_name = relative_path
            .file_name()
            .map(strip_extension)
            .unwrap_or("Untitled")
            .to_string();
        let display_path = strip_extension(relative_path.as_str()).to_string();

        Self {
            relative_path,
            display_name,
            display_path,
        }
    }

    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// File name without the .html/.htm extension
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Relative path without the extension, for use in titles
    pub fn display_path(&self) -> &str {
        &self.display_path
    }
}

fn strip_extension(name: &str) -> &str {
    EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

impl From<RelativePathBuf> for TemplateFile {
    fn from(path: RelativePathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for TemplateFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}
