// Prompt files exposed as MCP resources

use crate::protocol::{ReadResourceResult, ResourceContents, ResourceDescriptor};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// The prompt files served under `file://` URIs, resolved relative to the
/// process working directory.
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resources advertised by `resources/list`.
    pub fn list(&self) -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor {
                uri: "file://prompts/system-prompt.md".to_string(),
                name: "System Prompt".to_string(),
                description: "System prompt for the Airtable server".to_string(),
                mime_type: "text/markdown".to_string(),
            },
            ResourceDescriptor {
                uri: "file://prompts/project-knowledge.md".to_string(),
                name: "Project Knowledge".to_string(),
                description: "Project-specific knowledge".to_string(),
                mime_type: "text/markdown".to_string(),
            },
        ]
    }

    /// Whether a URI uses the only scheme this server serves.
    pub fn supports(uri: &str) -> bool {
        uri.starts_with("file://")
    }

    /// Read a `file://` resource relative to the root directory.
    pub async fn read(&self, uri: &str) -> Result<ReadResourceResult> {
        let relative = uri
            .strip_prefix("file://")
            .context("unsupported URI scheme")?
            .trim_start_matches('/');
        let path = self.root.join(relative);

        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read resource {}", path.display()))?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: "text/markdown".to_string(),
                text,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_both_prompt_files() {
        let resources = Resources::new(PathBuf::from("."));
        let listed = resources.list();

        assert_eq!(listed.len(), 2);
        assert!(listed
            .iter()
            .any(|r| r.uri == "file://prompts/system-prompt.md"));
        assert!(listed
            .iter()
            .any(|r| r.uri == "file://prompts/project-knowledge.md"));
    }

    #[test]
    fn test_supports_only_file_uris() {
        assert!(Resources::supports("file://prompts/system-prompt.md"));
        assert!(!Resources::supports("https://example.com/prompt.md"));
    }

    #[tokio::test]
    async fn test_read_resolves_relative_to_root() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("prompts")).unwrap();
        std::fs::write(
            temp_dir.path().join("prompts/system-prompt.md"),
            "# System Prompt",
        )
        .unwrap();

        let resources = Resources::new(temp_dir.path().to_path_buf());
        let result = resources
            .read("file://prompts/system-prompt.md")
            .await
            .unwrap();

        assert_eq!(result.contents.len(), 1);
        assert_eq!(result.contents[0].text, "# System Prompt");
        assert_eq!(result.contents[0].mime_type, "text/markdown");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let resources = Resources::new(temp_dir.path().to_path_buf());

        assert!(resources.read("file://prompts/missing.md").await.is_err());
    }
}
