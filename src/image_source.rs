use std::io;
use std::path::PathBuf;

/// Where candidate images come from. The feed only ever lists and reads;
/// it never mutates or deletes source files.
pub trait ImageSource: Send + Sync {
    /// File names (not paths) of every entry in the source.
    fn list(&self) -> io::Result<Vec<String>>;

    /// Raw bytes of one named entry.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Returns true for file names with a recognized image extension.
pub fn is_image_file(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png")
        }
        _ => false,
    }
}

/// A flat directory of images on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirImageSource {
    root: PathBuf,
}

impl DirImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirImageSource { root: root.into() }
    }
}

impl ImageSource for DirImageSource {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(name))
    }
}
