use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Identifies a contract either by its bare name or by `path:name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub path: Option<PathBuf>,
    pub name: String,
}

impl ContractSpec {
    pub fn path_name(path: PathBuf, name: impl ToString) -> Self {
        Self {
            path: Some(path),
            name: name.to_string(),
        }
    }

    pub fn name(name: impl ToString) -> Self {
        Self {
            path: None,
            name: name.to_string(),
        }
    }

    fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }
}

impl FromStr for ContractSpec {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let spec = match s.rsplit_once(':') {
            Some((path, name)) => {
                if path.is_empty() {
                    eyre::bail!("Missing source path in {s}");
                }
                Self::path_name(PathBuf::from(path), name)
            }
            None => Self::name(s),
        };

        if spec.name.is_empty() {
            eyre::bail!("Missing contract name in {s:?}");
        }

        Ok(spec)
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = self.path.as_deref() {
            write!(f, "{}:{}", path.display(), self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A compiled contract ready to be deployed
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub source: PathBuf,
    pub abi: Abi,
    pub bytecode: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("multiple artifacts match {name}, use one of: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("reading {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{name} has no bytecode, it is abstract or an interface")]
    EmptyBytecode { name: String },

    #[error("{name} takes constructor arguments")]
    ConstructorArgs { name: String },

    #[error("walking the artifact store")]
    Walk(#[from] walkdir::Error),

    #[error("artifact lookup task failed")]
    Join(#[from] tokio::task::JoinError),
}

// Hardhat writes the bytecode as a hex string, Foundry nests it
#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(Bytes),
    Object { object: Bytes },
}

#[derive(Deserialize)]
struct ArtifactFile {
    abi: Abi,
    bytecode: BytecodeField,
}

/// Compiled contracts on disk, in either the Hardhat (`artifacts/`) or
/// Foundry (`out/`) layout
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds the artifact file for `spec`, `None` if nothing matches
    pub fn find(
        &self,
        spec: &ContractSpec,
    ) -> Result<Option<PathBuf>, ArtifactError> {
        if !self.root.is_dir() {
            return Ok(None);
        }

        let file_name = spec.file_name();
        let mut candidates = vec![];

        let entries = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != "build-info");

        for entry in entries {
            let entry = entry?;

            if !entry.file_type().is_file()
                || entry.file_name() != file_name.as_str()
            {
                continue;
            }

            let Some(source_dir) = entry.path().parent() else {
                continue;
            };

            let is_solidity_dir = source_dir
                .extension()
                .map_or(false, |extension| extension == "sol");

            if !is_solidity_dir {
                continue;
            }

            if let Some(path) = spec.path.as_deref() {
                let relative =
                    source_dir.strip_prefix(&self.root).unwrap_or(source_dir);

                if !path.ends_with(relative) {
                    continue;
                }
            }

            candidates.push(entry.into_path());
        }

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.pop()),
            _ => {
                candidates.sort();

                Err(ArtifactError::Ambiguous {
                    name: spec.name.clone(),
                    candidates: candidates
                        .iter()
                        .map(|candidate| candidate.display().to_string())
                        .collect(),
                })
            }
        }
    }

    #[instrument(skip(self), fields(store = %self.root.display()))]
    pub async fn resolve(
        &self,
        spec: &ContractSpec,
    ) -> Result<Option<ContractArtifact>, ArtifactError> {
        let store = self.clone();
        let lookup = spec.clone();
        let found =
            tokio::task::spawn_blocking(move || store.find(&lookup)).await??;

        let Some(path) = found else {
            return Ok(None);
        };

        debug!(path = %path.display(), "Found artifact");

        let content = tokio::fs::read_to_string(&path).await.map_err(
            |source| ArtifactError::Read {
                path: path.clone(),
                source,
            },
        )?;

        let file: ArtifactFile =
            serde_json::from_str(&content).map_err(|source| {
                ArtifactError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

        let bytecode = match file.bytecode {
            BytecodeField::Hex(bytes) => bytes,
            BytecodeField::Object { object } => object,
        };

        if bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode {
                name: spec.name.clone(),
            });
        }

        let takes_args = file
            .abi
            .constructor()
            .map_or(false, |constructor| !constructor.inputs.is_empty());

        if takes_args {
            return Err(ArtifactError::ConstructorArgs {
                name: spec.name.clone(),
            });
        }

        Ok(Some(ContractArtifact {
            name: spec.name.clone(),
            source: path,
            abi: file.abi,
            bytecode,
        }))
    }
}
