use std::path::{Path, PathBuf};

/// Where image files live, relative paths from `metadata.csv` are joined
/// onto this to produce the location handed to the image fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A folder on disk.
    Local(PathBuf),
    /// An `http://` or `https://` prefix.
    Remote(String),
}

impl ImageSource {
    /// Interpret a user-supplied base: URLs become [`ImageSource::Remote`],
    /// anything else a local folder.
    pub fn parse(base: &str) -> Self {
        let lower = base.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Remote(base.trim_end_matches('/').to_string())
        } else {
            ImageSource::Local(PathBuf::from(base))
        }
    }

    pub fn resolve(&self, relative_path: &str) -> String {
        match self {
            ImageSource::Local(root) => {
                let mut path = root.clone();
                for part in relative_path.split('/').filter(|p| !p.is_empty()) {
                    path.push(part);
                }
                path.display().to_string()
            }
            ImageSource::Remote(prefix) => {
                format!("{prefix}/{}", relative_path.trim_start_matches('/'))
            }
        }
    }
}

impl From<&Path> for ImageSource {
    fn from(root: &Path) -> Self {
        ImageSource::Local(root.to_path_buf())
    }
}
