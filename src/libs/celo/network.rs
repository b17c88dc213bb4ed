//! Chain descriptors and the registry the provider picks them from.
//!
//! Descriptors serialize with the same keys wallets use for
//! `wallet_addEthereumChain`-style payloads (`id`, `hexId`, `rpcUrl`, ...),
//! so a registry can be loaded from JSON as well as from the presets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    #[serde(rename = "id")]
    pub chain_id: u64,
    #[serde(rename = "hexId")]
    pub hex_chain_id: String,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub native_currency: NativeCurrency,
}

impl NetworkDescriptor {
    pub fn celo_mainnet() -> Self {
        Self {
            chain_id: 42220,
            hex_chain_id: "0xa4ec".to_string(),
            name: "Celo Mainnet".to_string(),
            rpc_url: "https://forno.celo.org".to_string(),
            explorer_url: "https://celoscan.com".to_string(),
            native_currency: celo_currency(),
        }
    }

    pub fn celo_alfajores() -> Self {
        Self {
            chain_id: 44787,
            hex_chain_id: "0xaef3".to_string(),
            name: "Celo Testnet Alfajores".to_string(),
            rpc_url: "https://alfajores-forno.celo-testnet.org".to_string(),
            explorer_url: "https://alfajores-blockscout.celo-testnet.org/".to_string(),
            native_currency: celo_currency(),
        }
    }

    /// Same network, different endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: impl std::fmt::Display) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }

    /// Explorer link for an account or contract.
    pub fn address_url(&self, address: impl std::fmt::Display) -> String {
        format!("{}/address/{}", self.explorer_url.trim_end_matches('/'), address)
    }

    pub fn validate(&self) -> Result<()> {
        let expected = format!("{:#x}", self.chain_id);
        if !self.hex_chain_id.eq_ignore_ascii_case(&expected) {
            return Err(Error::Config(format!(
                "{}: hexId {} does not match id {} ({expected})",
                self.name, self.hex_chain_id, self.chain_id
            )));
        }
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(Error::InvalidUrl {
                url: self.rpc_url.clone(),
                reason: "RPC URL must start with http:// or https://".to_string(),
            });
        }
        Ok(())
    }
}

fn celo_currency() -> NativeCurrency {
    NativeCurrency {
        symbol: "CELO".to_string(),
        decimals: crate::constants::CELO_DECIMALS,
    }
}

/// Read-only lookup of descriptors by name.  Built once and passed by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkRegistry {
    #[serde(flatten)]
    networks: HashMap<String, NetworkDescriptor>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `mainnet`, `testnet` and its alias `alfajores`.
    pub fn celo() -> Self {
        Self::new()
            .with("mainnet", NetworkDescriptor::celo_mainnet())
            .with("testnet", NetworkDescriptor::celo_alfajores())
            .with("alfajores", NetworkDescriptor::celo_alfajores())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let registry: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("bad network registry json: {e}")))?;
        for network in registry.networks.values() {
            network.validate()?;
        }
        Ok(registry)
    }

    pub fn with(mut self, name: &str, network: NetworkDescriptor) -> Self {
        self.networks.insert(name.to_ascii_lowercase(), network);
        self
    }

    pub fn get(&self, name: &str) -> Result<&NetworkDescriptor> {
        self.networks
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| Error::UnknownNetwork(name.to_string()))
    }

    pub fn by_chain_id(&self, chain_id: u64) -> Option<&NetworkDescriptor> {
        self.networks.values().find(|n| n.chain_id == chain_id)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.networks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
