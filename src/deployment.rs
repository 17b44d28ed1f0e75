use ethers::types::{Address, H256};
use tracing::{info, instrument, warn};

use crate::artifacts::{ContractArtifact, ContractSpec};
use crate::provider::{BoxError, DeploymentProvider};
use crate::report::contract_deployment::ContractDeployment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DeploymentStage {
    #[display(fmt = "start")]
    Start,
    #[display(fmt = "artifact-resolved")]
    ArtifactResolved,
    #[display(fmt = "submitted")]
    Submitted,
    #[display(fmt = "confirmed")]
    Confirmed,
    #[display(fmt = "done")]
    Done,
    #[display(fmt = "failed")]
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("no artifact found for {name}")]
    ArtifactNotFound { name: String },

    #[error("artifact for {name} cannot be deployed")]
    InvalidArtifact {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("submitting the deployment of {name} failed")]
    Submission {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("the deployment of {name} was not confirmed")]
    Confirmation {
        name: String,
        #[source]
        source: BoxError,
    },
}

pub type DeploymentResult = Result<ContractDeployment, DeployError>;

/// A submitted deployment, [`DeploymentHandle::confirm`] attaches the
/// contract address once it is mined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentHandle {
    pub contract_name: String,
    pub chain_id: u64,
    pub transaction_hash: H256,
    pub deployer: Address,
}

impl DeploymentHandle {
    pub fn new(
        contract_name: impl ToString,
        chain_id: u64,
        transaction_hash: H256,
        deployer: Address,
    ) -> Self {
        Self {
            contract_name: contract_name.to_string(),
            chain_id,
            transaction_hash,
            deployer,
        }
    }

    pub fn confirm(self, address: Address) -> ContractDeployment {
        ContractDeployment {
            contract_name: self.contract_name,
            chain_id: self.chain_id,
            address,
            transaction_hash: self.transaction_hash,
            deployer: self.deployer,
        }
    }
}

/// Runs a single deployment through a provider
///
/// `deploy` consumes the deployer, so every instance makes at most one
/// attempt.
pub struct Deployer<P> {
    provider: P,
    stage: DeploymentStage,
}

impl<P> Deployer<P>
where
    P: DeploymentProvider,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            stage: DeploymentStage::Start,
        }
    }

    #[instrument(name = "deploy", skip_all, fields(contract = %contract))]
    pub async fn deploy(mut self, contract: &ContractSpec) -> DeploymentResult {
        match self.run_steps(contract).await {
            Ok(deployment) => {
                self.advance(DeploymentStage::Done);
                Ok(deployment)
            }
            Err(err) => {
                warn!(stage = %self.stage, "Deployment failed");
                self.advance(DeploymentStage::Failed);
                Err(err)
            }
        }
    }

    async fn run_steps(
        &mut self,
        contract: &ContractSpec,
    ) -> DeploymentResult {
        let artifact = self.resolve_artifact(contract).await?;
        self.advance(DeploymentStage::ArtifactResolved);

        let handle = self.submit(&artifact).await?;
        self.advance(DeploymentStage::Submitted);

        let address = self.await_confirmation(&handle).await?;
        self.advance(DeploymentStage::Confirmed);

        Ok(handle.confirm(address))
    }

    #[instrument(skip_all)]
    async fn resolve_artifact(
        &self,
        contract: &ContractSpec,
    ) -> Result<ContractArtifact, DeployError> {
        let name = contract.name.clone();

        match self.provider.resolve_artifact(contract).await {
            Ok(Some(artifact)) => {
                info!(source = %artifact.source.display(), "Artifact resolved");
                Ok(artifact)
            }
            Ok(None) => Err(DeployError::ArtifactNotFound { name }),
            Err(source) => Err(DeployError::InvalidArtifact { name, source }),
        }
    }

    #[instrument(skip_all)]
    async fn submit(
        &self,
        artifact: &ContractArtifact,
    ) -> Result<DeploymentHandle, DeployError> {
        let handle = self.provider.submit(artifact).await.map_err(|source| {
            DeployError::Submission {
                name: artifact.name.clone(),
                source,
            }
        })?;

        info!(tx_hash = ?handle.transaction_hash, "Deployment submitted");

        Ok(handle)
    }

    #[instrument(skip_all, fields(tx_hash = ?handle.transaction_hash))]
    async fn await_confirmation(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<Address, DeployError> {
        self.provider
            .await_confirmation(handle)
            .await
            .map_err(|source| DeployError::Confirmation {
                name: handle.contract_name.clone(),
                source,
            })
    }

    fn advance(&mut self, stage: DeploymentStage) {
        info!(from = %self.stage, to = %stage, "Deployment stage");
        self.stage = stage;
    }
}
