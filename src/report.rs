use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::serde_utils;

pub mod contract_deployment;

use self::contract_deployment::ContractDeployment;

/// Record of a finished deployment, written for humans and CI jobs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub deployment: ContractDeployment,
}

impl Report {
    pub fn new(deployment: ContractDeployment) -> Self {
        Self { deployment }
    }

    pub async fn write(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();

        serde_utils::write_serialize(path, self).await?;

        info!(path = %path.display(), "Report written");

        Ok(())
    }
}
