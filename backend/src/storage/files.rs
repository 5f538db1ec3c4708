//! Object storage for uploaded files (transcripts, photos, class material).

use anyhow::{Context, Result};
use async_trait::async_trait;
use opendal::{services, Operator};
use tracing::info;

use crate::domain::commands::files::UploadedFile;

const MAX_SLUG_LEN: usize = 50;
const MAX_EXTENSION_LEN: usize = 10;
const FALLBACK_SLUG: &str = "arquivo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFolder {
    AcademicHistories,
    Photos,
    ClassFiles,
}

impl FileFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFolder::AcademicHistories => "academic-histories",
            FileFolder::Photos => "photos",
            FileFolder::ClassFiles => "class-files",
        }
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores the file under `folder` and returns its public URL
    async fn upload(&self, folder: FileFolder, file: &UploadedFile) -> Result<String>;
}

/// `{folder}/{unique_id}-{slug}{.ext}`
pub fn storage_path(folder: FileFolder, original_name: &str, unique_id: &str) -> String {
    let (stem, extension) = match original_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, sanitize_extension(ext)),
        _ => (original_name, None),
    };

    let slug = slugify(stem, MAX_SLUG_LEN);
    let slug = if slug.is_empty() { FALLBACK_SLUG.to_string() } else { slug };

    match extension {
        Some(ext) => format!("{}/{}-{}.{}", folder.as_str(), unique_id, slug, ext),
        None => format!("{}/{}-{}", folder.as_str(), unique_id, slug),
    }
}

/// Lowercase ASCII letters and digits joined by single dashes, at most
/// `max_len` characters, never starting or ending with a dash
pub fn slugify(value: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    let slug: String = slug.chars().take(max_len).collect();
    slug.trim_end_matches('-').to_string()
}

fn sanitize_extension(raw: &str) -> Option<String> {
    let extension: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_ascii_lowercase();
    (!extension.is_empty()).then_some(extension)
}

/// [`FileStorage`] backed by an OpenDAL operator
#[derive(Clone)]
pub struct OperatorFileStore {
    operator: Operator,
    public_base_url: String,
}

impl OperatorFileStore {
    pub fn new(operator: Operator, public_base_url: &str) -> Self {
        Self {
            operator,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Files on the local filesystem under `root`
    pub fn local(root: &str, public_base_url: &str) -> Result<Self> {
        std::fs::create_dir_all(root).with_context(|| format!("failed to create upload dir {}", root))?;
        let operator = Operator::new(services::Fs::default().root(root))?.finish();
        Ok(Self::new(operator, public_base_url))
    }

    pub fn in_memory(public_base_url: &str) -> Result<Self> {
        let operator = Operator::new(services::Memory::default())?.finish();
        Ok(Self::new(operator, public_base_url))
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.operator.read(path).await?.to_vec())
    }

    /// Path part of a URL produced by [`FileStorage::upload`]
    pub fn path_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_base_url)?.strip_prefix('/')
    }
}

#[async_trait]
impl FileStorage for OperatorFileStore {
    async fn upload(&self, folder: FileFolder, file: &UploadedFile) -> Result<String> {
        let unique_id = uuid::Uuid::new_v4().to_string();
        let path = storage_path(folder, &file.file_name, &unique_id);

        self.operator
            .write(&path, file.bytes.clone())
            .await
            .with_context(|| format!("failed to write {}", path))?;

        info!("Stored {} ({} bytes)", path, file.bytes.len());
        Ok(format!("{}/{}", self.public_base_url, path))
    }
}
