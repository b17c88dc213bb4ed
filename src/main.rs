use anyhow::{Context, Result};
use celo_web3::libs::celo::spells::{format_amount, parse_amount};
use celo_web3::libs::config::Config;
use celo_web3::libs::writing::cc;
use celo_web3::{log, warn};
use celo_web3::{NetworkRegistry, Provider};
use stables::{TokenAddressTable, KNOWN_STABLES};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let registry = NetworkRegistry::celo();
    let provider = Provider::from_config(&config, &registry)
        .with_context(|| {
            format!(
                "cannot build provider for `{}` (known: {})",
                config.network,
                registry.names().join(", ")
            )
        })?;

    print_network(&provider)?;

    match provider.verify_chain_id().await {
        Ok(id) => log!(cc::LIGHT_GREEN, "endpoint serves chain {}", id),
        Err(e) => warn!("chain id check failed: {e}"),
    }

    if let Some(address) = config.query_address()? {
        report_balances(&provider, &config, address).await?;
    }

    if let Some((to, amount)) = config.transfer()? {
        send_transfer(&provider, &config, to, &amount).await?;
    }

    Ok(())
}

fn print_network(provider: &Provider) -> Result<()> {
    let network = serde_json::to_string_pretty(provider.get_network())?;
    log!(cc::BOLD, "{}", network);
    Ok(())
}

async fn report_balances(
    provider: &Provider,
    config: &Config,
    address: alloy::primitives::Address,
) -> Result<()> {
    let native = provider.balance_formatted(address).await?;
    log!(cc::CYAN, "{} balance: {}", address, native);

    for table in KNOWN_STABLES.iter() {
        let Some(token) = table.by_network(&config.network) else {
            continue;
        };
        let meta = match stables::token_meta(provider.client().clone(), token).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("{}: metadata unavailable: {e}", table.symbol);
                continue;
            }
        };
        let raw = provider.token_balance(token, address).await?;
        log!(
            cc::CYAN,
            "{} balance: {} {}",
            address,
            format_amount(raw, meta.decimals)?,
            meta.symbol
        );
    }
    log!(cc::LIGHT_GRAY, "{}", provider.get_network().address_url(address));
    Ok(())
}

async fn send_transfer(
    provider: &Provider,
    config: &Config,
    to: alloy::primitives::Address,
    amount: &str,
) -> Result<()> {
    let from = provider
        .signer_address()
        .context("PRIVATE_KEY is required to send a transfer")?;

    let hash = match config.transfer_token.as_deref() {
        None => {
            let decimals = provider.get_network().native_currency.decimals;
            provider
                .transfer(from, to, parse_amount(amount, decimals)?, None)
                .await?
        }
        Some(symbol) => {
            let table = find_stable(symbol)?;
            provider
                .transfer_stable(from, to, parse_amount(amount, table.decimals)?, &table)
                .await?
        }
    };

    log!(cc::LIGHT_GREEN, "transfer sent: {}", hash);
    log!(cc::LIGHT_GRAY, "{}", provider.get_network().tx_url(hash));
    Ok(())
}

fn find_stable(symbol: &str) -> Result<TokenAddressTable> {
    KNOWN_STABLES
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .copied()
        .with_context(|| format!("unknown stable token `{symbol}`"))
}
