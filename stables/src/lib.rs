//! Celo stable token addresses and the ERC-20 surface used to move and describe them.

pub mod abi;
pub mod addresses;
pub mod balance;

pub use abi::*;
pub use addresses::*;
pub use balance::*;
