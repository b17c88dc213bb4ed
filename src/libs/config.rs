use {
    anyhow::{Context, Result},
    dotenv::dotenv,
    serde::{Deserialize, Serialize},
    alloy::primitives::Address,
    std::{fmt::Debug, str::FromStr},
};

use crate::constants::DEFAULT_NETWORK;

pub fn load_env() {
    dotenv().ok();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry key of the network to connect to ("mainnet", "testnet", ...).
    pub network: String,
    /// Replaces the preset RPC URL of the selected network.
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    /// Account the binary reports balances for.
    pub query_address: Option<String>,
    /// Recipient of the optional transfer; needs `private_key`.
    pub transfer_to: Option<String>,
    /// Decimal amount, e.g. "0.5".
    pub transfer_amount: Option<String>,
    /// Stable token symbol ("cUSD", "cEUR"); native CELO when unset.
    pub transfer_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_env();
        let network = std::env::var("CELO_NETWORK").unwrap_or_else(|_| DEFAULT_NETWORK.to_string());
        if network.trim().is_empty() {
            anyhow::bail!("config.rs: CELO_NETWORK is set but empty");
        }
        Ok(Self {
            network: network.trim().to_ascii_lowercase(),
            rpc_url: non_empty_var("CELO_RPC"),
            private_key: non_empty_var("PRIVATE_KEY"),
            query_address: non_empty_var("CELO_QUERY_ADDRESS"),
            transfer_to: non_empty_var("CELO_TRANSFER_TO"),
            transfer_amount: non_empty_var("CELO_TRANSFER_AMOUNT"),
            transfer_token: non_empty_var("CELO_TRANSFER_TOKEN"),
        })
    }

    /// Parse env var to T; fall back to typed default.
    pub fn get_var_t<T>(key: &str, default: T) -> T
    where
        T: FromStr,
        <T as FromStr>::Err: Debug,
    {
        std::env::var(key)
            .ok()
            .and_then(|s| s.parse::<T>().ok())
            .unwrap_or(default)
    }

    pub fn query_address(&self) -> Result<Option<Address>> {
        parse_address_var("CELO_QUERY_ADDRESS", self.query_address.as_deref())
    }

    /// Recipient and amount when both are configured.
    pub fn transfer(&self) -> Result<Option<(Address, String)>> {
        let to = parse_address_var("CELO_TRANSFER_TO", self.transfer_to.as_deref())?;
        match (to, &self.transfer_amount) {
            (Some(to), Some(amount)) => Ok(Some((to, amount.clone()))),
            (None, None) => Ok(None),
            _ => anyhow::bail!("CELO_TRANSFER_TO and CELO_TRANSFER_AMOUNT must be set together"),
        }
    }
}

fn parse_address_var(key: &str, value: Option<&str>) -> Result<Option<Address>> {
    value
        .map(|s| {
            s.parse()
                .with_context(|| format!("{key} is not an address: {s}"))
        })
        .transpose()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
