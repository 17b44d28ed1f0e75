use ethers::types::{Address, H256};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ContractDeployment {
    pub contract_name: String,
    pub chain_id: u64,
    pub address: Address,
    pub transaction_hash: H256,
    pub deployer: Address,
}

impl ContractDeployment {
    /// The line printed once the contract is live
    pub fn summary(&self) -> String {
        format!(
            "{} contract deployed to: {}",
            self.contract_name,
            to_checksum(&self.address, None)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_checksummed_address() {
        let deployment = ContractDeployment {
            contract_name: "GasLessTrade".to_string(),
            chain_id: 1,
            address: "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
                .parse()
                .unwrap(),
            transaction_hash: H256::zero(),
            deployer: Address::zero(),
        };

        assert_eq!(
            deployment.summary(),
            "GasLessTrade contract deployed to: \
             0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }
}
