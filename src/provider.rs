//! The external collaborator the deployer talks to: artifact lookup,
//! transaction submission and confirmation.

use ethers::prelude::SignerMiddleware;
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, Eip1559TransactionRequest, H256};
use eyre::Context;
use tracing::{info, instrument};

use crate::artifacts::{ArtifactStore, ContractArtifact, ContractSpec};
use crate::config::DeployerConfig;
use crate::deployment::DeploymentHandle;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type RpcSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DeploymentProvider: Send + Sync {
    /// Looks up the compiled artifact, `Ok(None)` when there is none
    async fn resolve_artifact(
        &self,
        spec: &ContractSpec,
    ) -> Result<Option<ContractArtifact>, BoxError>;

    /// Sends the deployment transaction without waiting for it
    async fn submit(
        &self,
        artifact: &ContractArtifact,
    ) -> Result<DeploymentHandle, BoxError>;

    /// Waits until the deployment is mined and returns the contract address
    async fn await_confirmation(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<Address, BoxError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfirmationFailure {
    #[error("transaction {0:?} was dropped from the mempool")]
    Dropped(H256),

    #[error("transaction {0:?} reverted")]
    Reverted(H256),

    #[error("receipt of {0:?} has no contract address")]
    MissingContractAddress(H256),
}

/// Deploys over JSON-RPC, signing with a local wallet
///
/// Nothing is sent to the node until a deployment is submitted.
pub struct EthersProvider {
    provider: Provider<Http>,
    wallet: LocalWallet,
    artifacts: ArtifactStore,
}

impl EthersProvider {
    pub fn new(config: &DeployerConfig) -> eyre::Result<Self> {
        let provider = Provider::try_from(config.network.as_str())
            .context("Invalid network url")?;

        Ok(Self {
            provider,
            wallet: config.signer.wallet(),
            artifacts: ArtifactStore::new(&config.artifact_store),
        })
    }

    #[instrument(
        name = "connect",
        skip_all,
        fields(network = self.provider.url().host_str().unwrap_or_default())
    )]
    async fn signer(&self) -> Result<RpcSigner, BoxError> {
        let chain_id = self.provider.get_chainid().await?.as_u64();

        let wallet = self.wallet.clone().with_chain_id(chain_id);

        info!(chain_id, deployer = ?wallet.address(), "Connected");

        Ok(SignerMiddleware::new(self.provider.clone(), wallet))
    }
}

#[async_trait::async_trait]
impl DeploymentProvider for EthersProvider {
    async fn resolve_artifact(
        &self,
        spec: &ContractSpec,
    ) -> Result<Option<ContractArtifact>, BoxError> {
        Ok(self.artifacts.resolve(spec).await?)
    }

    async fn submit(
        &self,
        artifact: &ContractArtifact,
    ) -> Result<DeploymentHandle, BoxError> {
        let signer = self.signer().await?;

        let data: Bytes = match artifact.abi.constructor() {
            Some(constructor) => constructor
                .encode_input(artifact.bytecode.to_vec(), &[])?
                .into(),
            None => artifact.bytecode.clone(),
        };

        let mut tx = TypedTransaction::Eip1559(
            Eip1559TransactionRequest::new().data(data),
        );

        signer.fill_transaction(&mut tx, None).await?;

        let pending = signer.send_transaction(tx, None).await?;

        Ok(DeploymentHandle::new(
            artifact.name.clone(),
            signer.signer().chain_id(),
            pending.tx_hash(),
            signer.address(),
        ))
    }

    async fn await_confirmation(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<Address, BoxError> {
        let tx_hash = handle.transaction_hash;

        let receipt = PendingTransaction::new(tx_hash, &self.provider)
            .await?
            .ok_or(ConfirmationFailure::Dropped(tx_hash))?;

        if receipt.status != Some(1.into()) {
            return Err(ConfirmationFailure::Reverted(tx_hash).into());
        }

        Ok(receipt
            .contract_address
            .ok_or(ConfirmationFailure::MissingContractAddress(tx_hash))?)
    }
}
