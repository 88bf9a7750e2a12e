use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use backend_domain::utils::is_plain_template_name;
use backend_domain::TemplateRepository;

/// Presentation templates read from a directory, one file per reference.
pub struct FileTemplateRepository {
    dir: PathBuf,
}

impl FileTemplateRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TemplateRepository for FileTemplateRepository {
    async fn read_template(&self, reference: &str) -> anyhow::Result<String> {
        if !is_plain_template_name(reference) {
            anyhow::bail!("template reference must be a plain file name: {}", reference.trim());
        }
        let path = self.dir.join(reference.trim());
        fs::read_to_string(&path)
            .await
            .with_context(|| format!("read template {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_existing_and_rejects_traversal() {
        let dir =
            std::env::temp_dir().join(format!("adserve-templates-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("dir");
        std::fs::write(dir.join("KeywordTemplate1.html"), "<div class=\"keyword-item\"></div>")
            .expect("write");
        let repo = FileTemplateRepository::new(&dir);
        let markup = repo.read_template("KeywordTemplate1.html").await.expect("read");
        assert!(markup.contains("keyword-item"));
        assert!(repo.read_template("Missing.html").await.is_err());
        assert!(repo.read_template("../KeywordTemplate1.html").await.is_err());
        assert!(repo.read_template(" ").await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
