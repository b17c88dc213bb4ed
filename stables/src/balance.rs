use alloy::contract::Error as ContractError;
use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::transports::RpcError;
use anyhow::Result;

use crate::abi::IERC20;

#[derive(Debug, Clone)]
pub struct TokenMeta {
    pub symbol: String,
    pub decimals: u8,
}

/// Reads `symbol()` and `decimals()`.  A token that reverts or returns
/// nothing for `decimals()` gets 18; transport failures are returned.
pub async fn token_meta<P: Provider + Clone>(provider: P, token: Address) -> Result<TokenMeta> {
    let erc = IERC20::new(token, provider);
    let symbol = erc.symbol().call().await?;
    let decimals = match erc.decimals().call().await {
        Ok(decimals) => decimals,
        Err(ContractError::TransportError(RpcError::ErrorResp(_)))
        | Err(ContractError::ZeroData(..))
        | Err(ContractError::AbiError(_)) => 18,
        Err(e) => return Err(e.into()),
    };
    Ok(TokenMeta { symbol, decimals })
}
