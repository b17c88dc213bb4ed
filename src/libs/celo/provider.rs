use std::fmt;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider as RpcProvider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use stables::{TokenAddressTable, IERC20};
use url::Url;

use super::error::{Error, Result};
use super::network::{NetworkDescriptor, NetworkRegistry};
use super::spells::format_native;
use crate::libs::config::Config;
use crate::libs::writing::save_log_to_file;

pub type TxHash = B256;

/// One connection to a Celo JSON-RPC endpoint.  The endpoint is not
/// contacted until the first request; an unreachable node surfaces as
/// an error from that request.  Cloning shares the connection.
#[derive(Clone)]
pub struct Provider {
    network: NetworkDescriptor,
    testnet: bool,
    client: DynProvider,
    signer: Option<Address>,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("network", &self.network.name)
            .field("rpc_url", &self.network.rpc_url)
            .field("testnet", &self.testnet)
            .field("signer", &self.signer)
            .finish()
    }
}

impl Provider {
    /// Read-only connection.  Transactions sent through it are signed by
    /// the node (`eth_sendTransaction`), so `from` must be an account the
    /// node manages.
    pub fn new(network: NetworkDescriptor, testnet: bool) -> Result<Self> {
        let url = parse_rpc_url(&network.rpc_url)?;
        let client = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url)
            .erased();
        save_log_to_file(&format!("[provider] bound {} at {}", network.name, network.rpc_url));
        Ok(Self::with_client(network, testnet, client))
    }

    /// Connection with a local wallet; nonce, gas and chain id are filled
    /// in by the client before signing.
    pub fn with_signer(
        network: NetworkDescriptor,
        testnet: bool,
        signer: PrivateKeySigner,
    ) -> Result<Self> {
        let url = parse_rpc_url(&network.rpc_url)?;
        let signer = signer.with_chain_id(Some(network.chain_id));
        let address = signer.address();
        save_log_to_file(&format!(
            "[provider] bound {} at {} with signer {address}",
            network.name, network.rpc_url,
        ));
        let client = ProviderBuilder::new()
            .with_chain_id(network.chain_id)
            .wallet(signer)
            .connect_http(url)
            .erased();
        Ok(Self {
            signer: Some(address),
            ..Self::with_client(network, testnet, client)
        })
    }

    pub fn from_private_key(network: NetworkDescriptor, testnet: bool, key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|_| Error::Signer("private key is not a valid hex encoded secret".to_string()))?;
        Self::with_signer(network, testnet, signer)
    }

    /// Bind an already built client (custom transport or layers).
    pub fn with_client(network: NetworkDescriptor, testnet: bool, client: DynProvider) -> Self {
        Self {
            network,
            testnet,
            client,
            signer: None,
        }
    }

    /// Resolve `config.network` in `registry`, apply the RPC override and
    /// attach a signer when a private key is configured.
    pub fn from_config(config: &Config, registry: &NetworkRegistry) -> Result<Self> {
        let mut network = registry.get(&config.network)?.clone();
        if let Some(rpc) = &config.rpc_url {
            network = network.with_rpc_url(rpc.clone());
        }
        network.validate()?;
        let testnet = config.network != "mainnet";
        match &config.private_key {
            Some(key) => Self::from_private_key(network, testnet, key),
            None => Self::new(network, testnet),
        }
    }

    pub fn get_network(&self) -> &NetworkDescriptor {
        &self.network
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    pub fn client(&self) -> &DynProvider {
        &self.client
    }

    /// Account of the local wallet, if the provider was built with one.
    pub fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    /// `eth_chainId` as reported by the endpoint.
    pub async fn chain_id(&self) -> Result<u64> {
        Ok(self.client.get_chain_id().await?)
    }

    /// Fails when the endpoint serves a different chain than the descriptor names.
    pub async fn verify_chain_id(&self) -> Result<u64> {
        let actual = self.chain_id().await?;
        if actual != self.network.chain_id {
            return Err(Error::ChainMismatch {
                expected: self.network.chain_id,
                actual,
            });
        }
        Ok(actual)
    }

    /// Native balance in wei at the latest block.
    pub async fn balance(&self, address: Address) -> Result<U256> {
        Ok(self.client.get_balance(address).await?)
    }

    pub async fn balance_formatted(&self, address: Address) -> Result<String> {
        let wei = self.balance(address).await?;
        format_native(wei, &self.network.native_currency)
    }

    pub async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        let erc = IERC20::new(token, self.client.clone());
        Ok(erc.balanceOf(owner).call().await?)
    }

    /// Native transfer when `token` is `None`, otherwise an ERC-20
    /// `transfer(to, amount)` sent to the token contract.
    pub async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        token: Option<Address>,
    ) -> Result<TxHash> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_chain_id(self.network.chain_id);
        let tx = match token {
            None => tx.with_to(to).with_value(amount),
            Some(token) => tx
                .with_to(token)
                .with_input(stables::transfer_calldata(to, amount)),
        };

        let pending = self.client.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        save_log_to_file(&format!(
            "[provider] transfer {amount} {} -> {} ({}) tx {hash}",
            from,
            to,
            token.map_or_else(|| self.network.native_currency.symbol.clone(), |t| t.to_string()),
        ));
        Ok(hash)
    }

    /// Token transfer using the table entry for this provider's network.
    pub async fn transfer_stable(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        table: &TokenAddressTable,
    ) -> Result<TxHash> {
        self.transfer(from, to, amount, Some(table.address(self.testnet)))
            .await
    }
}

fn parse_rpc_url(rpc_url: &str) -> Result<Url> {
    Url::parse(rpc_url).map_err(|e| Error::InvalidUrl {
        url: rpc_url.to_string(),
        reason: e.to_string(),
    })
}
