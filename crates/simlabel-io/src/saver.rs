use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::IoError;

/// Serialization format of the files written by a [`FileSaver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// YAML documents with the `.yaml` extension.
    #[default]
    Yaml,
    /// Pretty-printed JSON documents with the `.json` extension.
    Json,
}

impl FileFormat {
    /// The file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Yaml => "yaml",
            FileFormat::Json => "json",
        }
    }

    /// Serialize `content` into a document of this format.
    pub fn encode<T: Serialize + ?Sized>(&self, content: &T) -> Result<String, IoError> {
        match self {
            FileFormat::Yaml => Ok(serde_yaml::to_string(content)?),
            FileFormat::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
                content.serialize(&mut ser)?;
                String::from_utf8(buf).map_err(|e| {
                    IoError::FileError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })
            }
        }
    }

    /// Deserialize a document of this format.
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, IoError> {
        match self {
            FileFormat::Yaml => Ok(serde_yaml::from_str(text)?),
            FileFormat::Json => Ok(serde_json::from_str(text)?),
        }
    }
}

impl FromStr for FileFormat {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            "json" => Ok(FileFormat::Json),
            other => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes structured documents under a root directory.
///
/// Every file name is resolved relative to the root and gets the extension of
/// the configured format. Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct FileSaver {
    root: PathBuf,
    format: FileFormat,
}

impl FileSaver {
    /// Create a saver, creating the root directory if it does not exist.
    pub fn new(root: impl AsRef<Path>, format: FileFormat) -> Result<Self, IoError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root, format })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The format of the written documents.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// The path a document named `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root
            .join(format!("{name}.{}", self.format.extension()))
    }

    /// Create `folder` (and its parents) under the root.
    pub fn create_dir(&self, folder: impl AsRef<Path>) -> Result<PathBuf, IoError> {
        let dir = self.root.join(folder);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Serialize `content` into `root/name.<ext>` and return the written path.
    ///
    /// `name` may contain sub-directories, which must already exist.
    pub fn save<T: Serialize + ?Sized>(&self, name: &str, content: &T) -> Result<PathBuf, IoError> {
        let path = self.path_for(name);
        let text = self.format.encode(content)?;
        fs::write(&path, text)?;
        log::debug!("saved {}", path.display());
        Ok(path)
    }
}

/// Read a whole YAML document into a typed record.
pub fn read_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, IoError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileDoesNotExist(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    FileFormat::Yaml.decode(&text)
}

/// Read a whole JSON document into a typed record.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, IoError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileDoesNotExist(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    FileFormat::Json.decode(&text)
}

/// Read a document, picking the format from the file extension.
pub fn read_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, IoError> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| IoError::InvalidFileExtension(path.to_path_buf()))?
        .parse::<FileFormat>()?;
    match format {
        FileFormat::Yaml => read_yaml(path),
        FileFormat::Json => read_json(path),
    }
}
