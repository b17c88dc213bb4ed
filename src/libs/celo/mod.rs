//! Celo client wrapper.  [`provider::Provider`] binds one RPC
//! connection to a [`network::NetworkDescriptor`];
//! [`contract::Contract`] binds an address and JSON ABI to that
//! connection.  Formatting helpers live in [`spells`].
pub mod contract;
pub mod error;
pub mod network;
pub mod provider;
pub mod spells;
