use alloy::primitives::{address, Address};

/// A token deployed on both Celo mainnet and the Alfajores testnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAddressTable {
    pub symbol: &'static str,
    pub decimals: u8,
    pub mainnet: Address,
    pub testnet: Address,
}

impl TokenAddressTable {
    pub fn address(&self, testnet: bool) -> Address {
        if testnet {
            self.testnet
        } else {
            self.mainnet
        }
    }

    /// Lookup by the network keys used across the crate ("mainnet" / "testnet").
    pub fn by_network(&self, network: &str) -> Option<Address> {
        match network.to_ascii_lowercase().as_str() {
            "mainnet" => Some(self.mainnet),
            "testnet" | "alfajores" => Some(self.testnet),
            _ => None,
        }
    }
}

/// Celo Dollar
pub const CUSD: TokenAddressTable = TokenAddressTable {
    symbol: "cUSD",
    decimals: 18,
    mainnet: address!("0x765DE816845861e75A25fCA122bb6898B8B1282a"),
    testnet: address!("0x874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1"),
};

/// Celo Euro
pub const CEUR: TokenAddressTable = TokenAddressTable {
    symbol: "cEUR",
    decimals: 18,
    mainnet: address!("0xD8763CBa276a3738E6DE85b4b3bF5FDed6D6cA73"),
    testnet: address!("0x10c892A6EC43a53E45D0B916B4b7D383B1b78C0F"),
};

pub const KNOWN_STABLES: [TokenAddressTable; 2] = [CUSD, CEUR];
