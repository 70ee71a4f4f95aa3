//! Fetcher over pre-rendered documentation files.
//!
//! Each `<root>/<name>.fjson` file is one page holding one record whose id is
//! the file name. Sphinx writes these files with its JSON builder.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::fetcher::{check_page, Fetcher};
use cpn_indexer_shared::{Page, Record};

/// Extension of the pre-rendered files.
pub const FILE_EXTENSION: &str = "fjson";

/// Fetcher that reads one local file per page.
#[derive(Debug, Clone)]
pub struct LocalFileFetcher {
    root: PathBuf,
    files: Vec<String>,
}

impl LocalFileFetcher {
    /// Create a fetcher over an explicit list of file names.
    ///
    /// Names are relative to `root` and carry no extension.
    pub fn new(root: impl Into<PathBuf>, files: Vec<String>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// Create a fetcher over every `.fjson` file below `root`, sorted by name.
    ///
    /// The directory walk runs on the blocking thread pool.
    pub async fn discover(root: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let root = root.into();
        let walk_root = root.clone();
        let files = tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            collect_files(&walk_root, &walk_root, &mut files)?;
            files.sort();
            Ok::<_, PipelineError>(files)
        })
        .await
        .map_err(|e| PipelineError::fetch(format!("file discovery task failed: {}", e)))??;

        debug!(root = %root.display(), count = files.len(), "Discovered local files");
        Ok(Self { root, files })
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, FILE_EXTENSION))
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<String>) -> Result<(), PipelineError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, files)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
            continue;
        }
        let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        files.push(name);
    }
    Ok(())
}

#[async_trait]
impl Fetcher for LocalFileFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, _locale: Option<&str>, page: u32) -> Result<Page, PipelineError> {
        check_page(page)?;

        if self.files.is_empty() {
            return Ok(Page::new(Vec::new(), 1, 1, 0));
        }

        let name = self.files.get(page as usize - 1).ok_or_else(|| {
            PipelineError::fetch(format!(
                "page {} is out of range, only {} files are configured",
                page,
                self.files.len()
            ))
        })?;
        let path = self.path_for(name);

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            PipelineError::fetch(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&contents).map_err(|e| {
            PipelineError::decode(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        let Value::Object(fields) = value else {
            return Err(PipelineError::decode(format!(
                "{} does not contain a JSON object",
                path.display()
            )));
        };

        let count = self.files.len();
        Ok(Page::new(
            vec![Record::from_fields(name.as_str(), fields)],
            page,
            count as u32,
            count as u64,
        ))
    }
}
