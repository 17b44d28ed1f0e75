use std::fmt;
use std::str::FromStr;

use ethers::prelude::k256::SecretKey;
use ethers::signers::LocalWallet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey {
    #[serde(with = "crate::serde_utils::secret_key")]
    pub key: SecretKey,
}

impl PrivateKey {
    pub fn wallet(&self) -> LocalWallet {
        LocalWallet::from(self.key.clone())
    }
}

impl FromStr for PrivateKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("0x");

        let bytes = hex::decode(s)?;

        let key = SecretKey::from_slice(&bytes)?;

        Ok(Self { key })
    }
}

/// Only the alternate form (`{:#}`) prints the key itself
impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x{}", hex::encode(self.key.to_bytes()))
        } else {
            write!(f, "0x****")
        }
    }
}
