pub mod constants;
pub mod libs;

pub use libs::celo::contract::{Contract, GasEstimate, Invocation};
pub use libs::celo::error::{Error, Result};
pub use libs::celo::network::{NativeCurrency, NetworkDescriptor, NetworkRegistry};
pub use libs::celo::provider::{Provider, TxHash};
