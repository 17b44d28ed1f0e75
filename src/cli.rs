use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;

pub mod private_key;

pub use private_key::PrivateKey;

use crate::artifacts::ContractSpec;

pub const DEFAULT_CONTRACT_NAME: &str = "GasLessTrade";

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case", about = "Deploys a single compiled contract")]
pub struct Args {
    /// Contract to deploy
    ///
    /// Either a bare name like 'GasLessTrade' or a fully qualified
    /// 'contracts/GasLessTrade.sol:GasLessTrade'
    #[clap(short = 'n', long, env, default_value = DEFAULT_CONTRACT_NAME)]
    pub contract_name: ContractSpec,

    /// Path to an optional deployer configuration file
    #[clap(short, long, env)]
    pub config: Option<PathBuf>,

    /// Private key of the deploying account
    #[clap(short, long, env)]
    pub private_key: Option<PrivateKey>,

    /// The RPC Url of the target chain
    #[clap(short, long, env)]
    pub rpc_url: Option<Url>,

    /// Directory holding compiled artifacts (defaults to 'artifacts')
    #[clap(short, long, env)]
    pub artifacts_dir: Option<PathBuf>,

    /// Where to write a report of the deployment
    #[clap(long, env)]
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_gasless_trade() {
        let args = Args::try_parse_from(["gasless-deployer"]).unwrap();

        assert_eq!(args.contract_name, ContractSpec::name("GasLessTrade"));
        assert!(args.report.is_none());
    }

    #[test]
    fn parses_qualified_contract_name() {
        let args = Args::try_parse_from([
            "gasless-deployer",
            "--contract-name",
            "contracts/GasLessTrade.sol:GasLessTrade",
            "--rpc-url",
            "http://localhost:8545",
        ])
        .unwrap();

        assert_eq!(
            args.contract_name,
            ContractSpec::path_name(
                "contracts/GasLessTrade.sol".into(),
                "GasLessTrade"
            )
        );
        assert_eq!(
            args.rpc_url.unwrap().as_str(),
            "http://localhost:8545/"
        );
    }
}
