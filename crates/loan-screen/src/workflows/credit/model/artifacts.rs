use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::super::domain::Kernel;
use super::super::features::FeatureOrder;
use super::pipeline::{SvmPipeline, PIPELINE_FORMAT_VERSION};
use super::LoanClassifier;

pub const FEATURE_ORDER_FILE: &str = "feature_order.json";

const STAGING_SUFFIX: &str = "staged";

/// Directory holding one pipeline per kernel plus the shared feature order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    root: PathBuf,
}

/// Final locations of the files written by [`ArtifactStore::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifacts {
    pub feature_order: PathBuf,
    pub pipelines: Vec<(Kernel, PathBuf)>,
}

/// Leading field of every pipeline artifact, read before the full layout is trusted.
#[derive(Deserialize)]
struct ArtifactHeader {
    format_version: u32,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn pipeline_path(&self, kernel: Kernel) -> PathBuf {
        self.root.join(kernel.artifact_file_name())
    }

    pub fn feature_order_path(&self) -> PathBuf {
        self.root.join(FEATURE_ORDER_FILE)
    }

    /// Kernels whose pipeline artifact exists on disk.
    pub fn available_kernels(&self) -> Vec<Kernel> {
        Kernel::ALL
            .into_iter()
            .filter(|kernel| self.pipeline_path(*kernel).is_file())
            .collect()
    }

    /// Write the feature order and `pipelines` as one set. Every file is staged next to its
    /// final name first; nothing is renamed into place until all of them were written, so a
    /// failed write leaves the previous artifacts untouched.
    pub fn publish(
        &self,
        order: &FeatureOrder,
        pipelines: &[&SvmPipeline],
    ) -> Result<PublishedArtifacts, ArtifactError> {
        fs::create_dir_all(&self.root).map_err(|source| ArtifactError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut staged = Vec::with_capacity(pipelines.len() + 1);
        if let Err(err) = self.stage_all(order, pipelines, &mut staged) {
            for (staging, _) in &staged {
                let _ = fs::remove_file(staging);
            }
            return Err(err);
        }

        for (staging, path) in &staged {
            fs::rename(staging, path).map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;
        }

        Ok(PublishedArtifacts {
            feature_order: self.feature_order_path(),
            pipelines: pipelines
                .iter()
                .map(|pipeline| (pipeline.kernel(), self.pipeline_path(pipeline.kernel())))
                .collect(),
        })
    }

    /// Reads the format version before the full pipeline so a layout change is reported as
    /// a version problem rather than a parse failure.
    pub fn load_pipeline(&self, kernel: Kernel) -> Result<SvmPipeline, ArtifactError> {
        let path = self.pipeline_path(kernel);
        let bytes = read_artifact(&path)?;

        let header: ArtifactHeader = parse_json(&path, &bytes)?;
        if header.format_version != PIPELINE_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                path,
                found: header.format_version,
                expected: PIPELINE_FORMAT_VERSION,
            });
        }

        parse_json(&path, &bytes)
    }

    pub fn load_feature_order(&self) -> Result<FeatureOrder, ArtifactError> {
        let path = self.feature_order_path();
        let bytes = read_artifact(&path)?;
        parse_json(&path, &bytes)
    }

    fn stage_all(
        &self,
        order: &FeatureOrder,
        pipelines: &[&SvmPipeline],
        staged: &mut Vec<(PathBuf, PathBuf)>,
    ) -> Result<(), ArtifactError> {
        let order_path = self.feature_order_path();
        staged.push((stage_json(&order_path, order)?, order_path));

        for pipeline in pipelines {
            let path = self.pipeline_path(pipeline.kernel());
            staged.push((stage_json(&path, pipeline)?, path));
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

fn stage_json<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, ArtifactError> {
    let staging = staging_path(path);
    let io_error = |source| ArtifactError::Io {
        path: staging.clone(),
        source,
    };

    let file = File::create(&staging).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| ArtifactError::Format {
        path: staging.clone(),
        source,
    })?;
    writer.flush().map_err(io_error)?;
    Ok(staging)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Failure reading or writing a trained artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact {} does not exist", path.display())]
    Missing { path: PathBuf },
    #[error("failed to access artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact {} is not valid: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact {} has format version {found}, expected {expected}", path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl ArtifactError {
    pub fn path(&self) -> &Path {
        match self {
            ArtifactError::Missing { path }
            | ArtifactError::Io { path, .. }
            | ArtifactError::Format { path, .. }
            | ArtifactError::UnsupportedVersion { path, .. } => path,
        }
    }
}
