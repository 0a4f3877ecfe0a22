use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::config::MediaConfig;

/// 媒体文件存储：缩略图落盘到 `root/<dir>/<filename>`，数据库只保存相对引用。
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(cfg: &MediaConfig) -> Self {
        Self::new(&cfg.root, &cfg.url_prefix)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 写入文件并返回相对引用（`dir/filename`）
    pub async fn save(&self, dir: &str, filename: &str, bytes: &[u8]) -> std::io::Result<String> {
        let target_dir = self.root.join(dir);
        tokio::fs::create_dir_all(&target_dir).await?;
        tokio::fs::write(target_dir.join(filename), bytes).await?;
        Ok(format!("{dir}/{filename}"))
    }

    /// 尽力删除已写入的文件（插入失败时回滚用），失败只记录日志
    pub async fn remove(&self, reference: &str) {
        let Some(path) = self.resolve(reference) else {
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("删除媒体文件失败 {:?}: {}", path, e);
        }
    }

    /// 相对引用 → 磁盘路径；拒绝绝对路径与 `..`
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let rel = Path::new(reference);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(rel))
    }

    /// 相对引用 → 对外 URL。空引用返回 None，已是绝对地址的原样返回。
    pub fn url_for(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if reference.starts_with("http://")
            || reference.starts_with("https://")
            || reference.starts_with('/')
        {
            return Some(reference.to_string());
        }
        Some(format!("{}/{}", self.url_prefix, reference))
    }
}

/// 生成不重复的图片文件名：`<prefix>_<32位hex>.png`
pub fn unique_image_name(prefix: &str) -> String {
    format!("{prefix}_{}.png", Uuid::new_v4().simple())
}
