use std::path::PathBuf;

use eyre::{Context, ContextCompat};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::cli::{Args, PrivateKey};
use crate::serde_utils;

pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Everything the deployment provider needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct DeployerConfig {
    /// Endpoint of the target chain
    pub network: Url,
    /// Credential of the deploying account
    pub signer: PrivateKey,
    /// Where compiled contracts are looked up
    pub artifact_store: PathBuf,
}

/// On-disk form of [`DeployerConfig`], every field may be overridden
/// from the command line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub network: Option<String>,

    #[serde(default)]
    pub signer: Option<PrivateKey>,

    #[serde(default)]
    pub artifact_store: Option<PathBuf>,
}

impl DeployerConfig {
    pub async fn load(args: &Args) -> eyre::Result<Self> {
        let file = match args.config.as_ref() {
            Some(path) => serde_utils::read_deserialize(path).await?,
            None => ConfigFile::default(),
        };

        Self::merge(args, file)
    }

    pub fn merge(args: &Args, file: ConfigFile) -> eyre::Result<Self> {
        let network = match (args.rpc_url.clone(), file.network) {
            (Some(url), _) => url,
            (None, Some(url)) => url
                .parse()
                .with_context(|| format!("Invalid network url {url}"))?,
            (None, None) => eyre::bail!(
                "Missing network, pass --rpc-url or set RPC_URL"
            ),
        };

        let signer = args
            .private_key
            .clone()
            .or(file.signer)
            .context("Missing signer, pass --private-key or set PRIVATE_KEY")?;

        let artifact_store = args
            .artifacts_dir
            .clone()
            .or(file.artifact_store)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        Ok(Self {
            network,
            signer,
            artifact_store,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use indoc::indoc;

    use super::*;

    const KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["gasless-deployer"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_win_over_file() {
        let file: ConfigFile = serde_yaml::from_str(indoc! {"
            network: http://file:8545
            artifact_store: out
        "})
        .unwrap();

        let config = DeployerConfig::merge(
            &args(&["--rpc-url", "http://flag:8545", "--private-key", KEY]),
            file,
        )
        .unwrap();

        assert_eq!(config.network.as_str(), "http://flag:8545/");
        assert_eq!(config.artifact_store, PathBuf::from("out"));
    }

    #[test]
    fn file_fills_missing_flags() {
        let file: ConfigFile = serde_yaml::from_str(&format!(
            "network: http://file:8545\nsigner: \"{KEY}\"\n"
        ))
        .unwrap();

        let config = DeployerConfig::merge(&args(&[]), file).unwrap();

        assert_eq!(config.network.as_str(), "http://file:8545/");
        assert_eq!(config.signer, KEY.parse::<PrivateKey>().unwrap());
        assert_eq!(
            config.artifact_store,
            PathBuf::from(DEFAULT_ARTIFACTS_DIR)
        );
    }

    #[test]
    fn missing_network_is_an_error() {
        let err = DeployerConfig::merge(
            &args(&["--private-key", KEY]),
            ConfigFile::default(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("Missing network"));
    }

    #[test]
    fn missing_signer_is_an_error() {
        let err = DeployerConfig::merge(
            &args(&["--rpc-url", "http://localhost:8545"]),
            ConfigFile::default(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("Missing signer"));
    }

    #[tokio::test]
    async fn loads_config_file() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("deployer.yml");
        tokio::fs::write(
            &path,
            format!("network: http://file:8545\nsigner: \"{KEY}\"\n"),
        )
        .await?;

        let config = DeployerConfig::load(&args(&[
            "--config",
            path.to_str().unwrap(),
        ]))
        .await?;

        assert_eq!(config.network.as_str(), "http://file:8545/");

        Ok(())
    }
}
