use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyze::AnalysisResult;
use crate::error::PublishError;
use crate::fixes::platform::{FrameworkConfig, Platform};
use crate::fixes::pr::{build_pr_description, PullRequestDraft};
use crate::fixes::validate::{validate_patch, PatchValidation};

/// One file the publisher should write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFile {
    pub platform: Platform,
    pub path: String,
    pub content: String,
    pub validation: PatchValidation,
}

impl PatchFile {
    /// Base64 content, as repository contents APIs expect it.
    pub fn encoded(&self) -> String {
        STANDARD.encode(self.content.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub draft: PullRequestDraft,
    pub files: Vec<PatchFile>,
}

impl PublishRequest {
    /// Pairs each rendered patch with its target config and validation.
    /// Validation warnings are attached, never enforced.
    pub fn from_analysis(result: &AnalysisResult, configs: &[FrameworkConfig]) -> Self {
        let files: Vec<PatchFile> = configs
            .iter()
            .filter_map(|cfg| {
                let content = result.fixes.get(&cfg.platform)?;
                Some(PatchFile {
                    platform: cfg.platform.clone(),
                    path: cfg.config_file.clone(),
                    validation: validate_patch(cfg, content),
                    content: content.clone(),
                })
            })
            .collect();
        let platforms: Vec<Platform> = files.iter().map(|f| f.platform.clone()).collect();
        Self {
            draft: build_pr_description(result, &platforms),
            files,
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .flat_map(|f| f.validation.warnings.iter().map(move |w| (f.path.as_str(), w.as_str())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// Where the change landed: a directory, a PR URL, ...
    pub location: String,
    pub files_written: usize,
}

/// Turns a publish request into a branch/commit/PR or equivalent. Called at
/// most once per analysis.
#[async_trait]
pub trait PatchPublisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, PublishError>;
}

/// Writes the patch files and `PULL_REQUEST.md` under a local directory.
pub struct DirectoryPublisher {
    root: PathBuf,
}

impl DirectoryPublisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn target(&self, relative: &str) -> PathBuf {
        // Keep writes inside the root even for hostile config paths.
        let clean: PathBuf = Path::new(relative)
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .collect();
        self.root.join(clean)
    }
}

async fn write(path: &Path, content: &str) -> Result<(), PublishError> {
    let io_err = |source| PublishError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, content).await.map_err(io_err)
}

#[async_trait]
impl PatchPublisher for DirectoryPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, PublishError> {
        if request.files.is_empty() {
            return Err(PublishError::Empty);
        }

        for file in &request.files {
            write(&self.target(&file.path), &file.content).await?;
        }

        let pr = format!("# {}\n\nBranch: `{}`\n\n{}", request.draft.title, request.draft.branch, request.draft.body);
        write(&self.root.join("PULL_REQUEST.md"), &pr).await?;

        info!(dir = %self.root.display(), files = request.files.len(), "patches written");
        Ok(PublishOutcome {
            location: self.root.display().to_string(),
            files_written: request.files.len(),
        })
    }
}
