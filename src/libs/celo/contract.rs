use std::fmt;

use alloy::dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy::json_abi::{Function, JsonAbi, StateMutability};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider as RpcProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::RpcError;

use super::error::{Error, Result};
use super::provider::{Provider, TxHash};
use super::spells::hex_quantity;
use crate::constants::DEFAULT_GAS;
use crate::libs::writing::save_log_to_file;

/// Result of `eth_estimateGas`.  `Fallback` means the node answered but
/// not with a number, and the contract's default gas was used instead.
/// A number too large for `u64` is an error, not a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasEstimate {
    Estimated(u64),
    Fallback(u64),
}

impl GasEstimate {
    pub fn value(&self) -> u64 {
        match self {
            Self::Estimated(gas) | Self::Fallback(gas) => *gas,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn to_hex(&self) -> String {
        hex_quantity(U256::from(self.value()))
    }
}

/// What [`Contract::invoke`] did with a method.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// `view`/`pure` method, answered by `eth_call`.
    Returned(Vec<DynSolValue>),
    /// State changing method, submitted with `eth_sendTransaction`.
    Submitted(TxHash),
}

/// A deployed contract bound to a provider's connection.
///
/// Methods are addressed by the names the ABI declares; arguments are
/// positional [`DynSolValue`]s (see [`Contract::coerce_args`] for string
/// input).  Overloads are told apart by argument count.
#[derive(Clone)]
pub struct Contract {
    address: Address,
    abi: JsonAbi,
    client: DynProvider,
    chain_id: u64,
    caller: Option<Address>,
    default_gas: u64,
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("methods", &self.method_names())
            .field("caller", &self.caller)
            .finish()
    }
}

impl Contract {
    /// Fails with [`Error::InvalidAddress`] before anything else is built.
    pub fn new(address: &str, abi: JsonAbi, provider: &Provider) -> Result<Self> {
        let address = validate_address(address)?;
        save_log_to_file(&format!(
            "[contract] {address} bound to {} ({} functions)",
            provider.get_network().name,
            abi.functions().count()
        ));
        Ok(Self {
            address,
            abi,
            client: provider.client().clone(),
            chain_id: provider.get_network().chain_id,
            caller: None,
            default_gas: *DEFAULT_GAS,
        })
    }

    /// Same as [`Contract::new`] with the ABI given as JSON text.
    pub fn from_abi_json(address: &str, abi_json: &str, provider: &Provider) -> Result<Self> {
        validate_address(address)?;
        let abi: JsonAbi = serde_json::from_str(abi_json)?;
        Self::new(address, abi, provider)
    }

    /// `from` used for calls, estimates and [`Contract::invoke`].
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_default_gas(mut self, gas: u64) -> Self {
        self.default_gas = gas;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed form of the address, whatever case it was given in.
    pub fn get_address(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Function names declared by the ABI, sorted, overloads listed once.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.abi.functions().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Parse string arguments into values of the method's parameter types.
    pub fn coerce_args(&self, method: &str, raw: &[&str]) -> Result<Vec<DynSolValue>> {
        let function = self.function(method, raw.len())?;
        function
            .inputs
            .iter()
            .zip(raw)
            .map(|(param, s)| {
                let ty: DynSolType = param.resolve()?;
                Ok(ty.coerce_str(s)?)
            })
            .collect()
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes> {
        let function = self.function(method, args.len())?;
        Ok(function.abi_encode_input(args)?.into())
    }

    /// `0x`-prefixed hex of [`Contract::encode_call`].
    pub fn get_data(&self, method: &str, args: &[DynSolValue]) -> Result<String> {
        let data = self.encode_call(method, args)?;
        Ok(format!("0x{}", hex::encode(data)))
    }

    pub async fn estimate_gas(&self, method: &str, args: &[DynSolValue]) -> Result<GasEstimate> {
        let tx = self.request(self.encode_call(method, args)?);
        let answer = self
            .client
            .raw_request::<_, U256>("eth_estimateGas".into(), (tx,))
            .await;
        match answer {
            Ok(gas) => u64::try_from(gas)
                .map(GasEstimate::Estimated)
                .map_err(|_| Error::GasOverflow(gas)),
            Err(RpcError::DeserError { text, .. }) => {
                crate::warn!(
                    "[contract] {method}: gas estimate `{text}` is not a number, using default {}",
                    self.default_gas
                );
                Ok(GasEstimate::Fallback(self.default_gas))
            }
            Err(RpcError::NullResp) => {
                crate::warn!(
                    "[contract] {method}: empty gas estimate, using default {}",
                    self.default_gas
                );
                Ok(GasEstimate::Fallback(self.default_gas))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Hex gas quantity, the estimate or the default gas.
    pub async fn get_estimate_gas(&self, method: &str, args: &[DynSolValue]) -> Result<String> {
        Ok(self.estimate_gas(method, args).await?.to_hex())
    }

    /// `eth_call` and decode the declared outputs.
    pub async fn call_method(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let function = self.function(method, args.len())?;
        let tx = self.request(function.abi_encode_input(args)?.into());
        let out = self.client.call(tx).await?;
        Ok(function.abi_decode_output(&out)?)
    }

    /// Submit a state changing call signed by `from` (or the provider's wallet).
    pub async fn send_method(
        &self,
        method: &str,
        args: &[DynSolValue],
        from: Address,
    ) -> Result<TxHash> {
        let tx = self
            .request(self.encode_call(method, args)?)
            .with_from(from)
            .with_chain_id(self.chain_id);
        let pending = self.client.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        save_log_to_file(&format!("[contract] {}.{method} sent in {hash}", self.address));
        Ok(hash)
    }

    /// Calls `view`/`pure` methods, sends the rest from the configured caller.
    pub async fn invoke(&self, method: &str, args: &[DynSolValue]) -> Result<Invocation> {
        let function = self.function(method, args.len())?;
        match function.state_mutability {
            StateMutability::Pure | StateMutability::View => {
                Ok(Invocation::Returned(self.call_method(method, args).await?))
            }
            StateMutability::NonPayable | StateMutability::Payable => {
                let from = self.caller.ok_or_else(|| {
                    Error::Config(format!("`{method}` changes state and needs a caller address"))
                })?;
                Ok(Invocation::Submitted(self.send_method(method, args, from).await?))
            }
        }
    }

    fn function(&self, method: &str, argc: usize) -> Result<&Function> {
        let overloads = self
            .abi
            .function(method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))?;
        overloads
            .iter()
            .find(|f| f.inputs.len() == argc)
            .ok_or_else(|| Error::ArgumentCount {
                method: method.to_string(),
                expected: overloads.iter().map(|f| f.inputs.len()).collect(),
                got: argc,
            })
    }

    fn request(&self, input: Bytes) -> TransactionRequest {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(input);
        match self.caller {
            Some(from) => tx.with_from(from),
            None => tx,
        }
    }
}

/// `0x` followed by 40 hex digits.  Mixed case must carry a valid
/// EIP-55 checksum; all-lower and all-upper input is taken as is.
pub fn validate_address(address: &str) -> Result<Address> {
    let invalid = || Error::InvalidAddress(address.to_string());
    let digits = address.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(address, None).map_err(|_| invalid())
    } else {
        address.parse::<Address>().map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::celo::network::NetworkDescriptor;
    use alloy::providers::{mock::Asserter, ProviderBuilder};
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::sol_types::{SolCall, SolValue};
    use hex_literal::hex;

    const ERC20_ABI: &str = r#"[
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"owner","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}]},
        {"type":"function","name":"decimals","stateMutability":"view",
         "inputs":[],"outputs":[{"name":"","type":"uint8"}]},
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"value","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]}
    ]"#;

    fn mocked(network: NetworkDescriptor) -> (Provider, Asserter) {
        let asserter = Asserter::new();
        let client = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone())
            .erased();
        (Provider::with_client(network, true, client), asserter)
    }

    fn token_address() -> String {
        stables::CUSD.testnet.to_checksum(None)
    }

    fn erc20(provider: &Provider) -> Contract {
        Contract::from_abi_json(&token_address(), ERC20_ABI, provider).unwrap()
    }

    /// Flip the case of the first letter in the hex part.
    fn break_checksum(checksummed: &str) -> String {
        let mut flipped = false;
        checksummed
            .char_indices()
            .map(|(i, c)| {
                if i >= 2 && !flipped && c.is_ascii_alphabetic() {
                    flipped = true;
                    if c.is_ascii_uppercase() {
                        c.to_ascii_lowercase()
                    } else {
                        c.to_ascii_uppercase()
                    }
                } else {
                    c
                }
            })
            .collect()
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        let (provider, _) = mocked(NetworkDescriptor::celo_alfajores());
        let good = token_address();
        let bad = [
            "".to_string(),
            "0x1234".to_string(),
            good.trim_start_matches("0x").to_string(),
            format!("{good}00"),
            format!("0x{}", "g".repeat(40)),
            break_checksum(&good),
        ];
        for address in bad {
            let err = Contract::from_abi_json(&address, ERC20_ABI, &provider).unwrap_err();
            assert!(
                matches!(err, Error::InvalidAddress(ref a) if *a == address),
                "{address} gave {err}"
            );
        }
    }

    #[test]
    fn invalid_address_wins_over_invalid_abi() {
        let (provider, _) = mocked(NetworkDescriptor::celo_alfajores());
        let err = Contract::from_abi_json("0xnope", "not json", &provider).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));

        let err = Contract::from_abi_json(&token_address(), "not json", &provider).unwrap_err();
        assert!(matches!(err, Error::Abi(_)));
    }

    #[test]
    fn accepts_single_case_and_checksummed_addresses() {
        let (provider, _) = mocked(NetworkDescriptor::celo_alfajores());
        let good = token_address();
        for address in [good.clone(), good.to_lowercase(), format!("0x{}", good[2..].to_uppercase())] {
            let contract = Contract::from_abi_json(&address, ERC20_ABI, &provider).unwrap();
            assert_eq!(contract.address(), stables::CUSD.testnet);
            assert_eq!(contract.get_address(), good);
        }
    }

    #[test]
    fn get_data_is_prefixed_encoder_output() {
        let (provider, _) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        let to = Address::repeat_byte(0x11);
        let value = U256::from(1_000u64);

        let data = contract
            .get_data(
                "transfer",
                &[DynSolValue::Address(to), DynSolValue::Uint(value, 256)],
            )
            .unwrap();
        let expected = stables::IERC20::transferCall { to, value }.abi_encode();
        assert!(data.starts_with("0x"));
        assert_eq!(data, format!("0x{}", hex::encode(expected)));

        let balance_of = contract
            .encode_call("balanceOf", &[DynSolValue::Address(to)])
            .unwrap();
        assert_eq!(
            balance_of.as_ref(),
            &hex!("70a082310000000000000000000000001111111111111111111111111111111111111111")[..]
        );
    }

    #[test]
    fn dispatch_rejects_unknown_and_mismatched_calls() {
        let (provider, _) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);

        assert!(matches!(
            contract.get_data("mint", &[]),
            Err(Error::UnknownMethod(m)) if m == "mint"
        ));
        assert!(matches!(
            contract.get_data("transfer", &[DynSolValue::Bool(true)]),
            Err(Error::ArgumentCount { expected, got: 1, .. }) if expected == vec![2]
        ));
        assert!(matches!(
            contract.get_data("balanceOf", &[DynSolValue::Bool(true)]),
            Err(Error::Abi(_))
        ));
        assert_eq!(contract.method_names(), vec!["balanceOf", "decimals", "transfer"]);
    }

    #[test]
    fn string_arguments_are_coerced_to_abi_types() {
        let (provider, _) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        let to = Address::repeat_byte(0x22);

        let args = contract
            .coerce_args("transfer", &[&to.to_string(), "1000"])
            .unwrap();
        assert_eq!(
            args,
            vec![
                DynSolValue::Address(to),
                DynSolValue::Uint(U256::from(1000u64), 256)
            ]
        );
        assert!(contract.coerce_args("transfer", &["0x12", "1"]).is_err());
    }

    #[tokio::test]
    async fn gas_estimate_is_hex_of_node_answer() {
        let (provider, asserter) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        asserter.push_success(&"0x5208");

        let args = [DynSolValue::Address(Address::repeat_byte(1))];
        let estimate = contract.estimate_gas("balanceOf", &args).await.unwrap();
        assert_eq!(estimate, GasEstimate::Estimated(21_000));
        assert_eq!(estimate.to_hex(), "0x5208");
    }

    #[tokio::test]
    async fn non_numeric_gas_estimate_falls_back_to_default() {
        let (provider, asserter) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        asserter.push_success(&"not-a-number");
        asserter.push_success(&serde_json::json!({"gas": 1}));

        let args = [DynSolValue::Address(Address::repeat_byte(1))];
        let hex = contract.get_estimate_gas("balanceOf", &args).await.unwrap();
        assert_eq!(hex, "0xc350");

        let custom = contract.clone().with_default_gas(90_000);
        let estimate = custom.estimate_gas("balanceOf", &args).await.unwrap();
        assert!(estimate.is_fallback());
        assert_eq!(estimate.value(), 90_000);
    }

    #[tokio::test]
    async fn oversized_gas_estimate_is_an_error() {
        let (provider, asserter) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        asserter.push_success(&"0x1ffffffffffffffff");
        asserter.push_success(&"0xffffffffffffffff");

        let args = [DynSolValue::Address(Address::repeat_byte(1))];
        let expected = (U256::from(u64::MAX) << 1usize) | U256::from(1u64);
        let err = contract.estimate_gas("balanceOf", &args).await.unwrap_err();
        assert!(matches!(err, Error::GasOverflow(gas) if gas == expected), "{err}");

        let max = contract.estimate_gas("balanceOf", &args).await.unwrap();
        assert_eq!(max, GasEstimate::Estimated(u64::MAX));
    }

    #[tokio::test]
    async fn gas_estimate_errors_are_raised() {
        let (provider, asserter) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        asserter.push_failure(ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: None,
        });

        let err = contract
            .get_estimate_gas("decimals", &[])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(3));
    }

    #[tokio::test]
    async fn call_method_decodes_outputs() {
        let (provider, asserter) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        asserter.push_success(&Bytes::from(U256::from(5u64).abi_encode()));

        let out = contract
            .call_method("balanceOf", &[DynSolValue::Address(Address::repeat_byte(1))])
            .await
            .unwrap();
        assert_eq!(out, vec![DynSolValue::Uint(U256::from(5u64), 256)]);
    }

    #[tokio::test]
    async fn call_method_raises_rpc_error_with_code() {
        let (provider, asserter) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        asserter.push_failure(ErrorPayload {
            code: -32015,
            message: "VM execution error".into(),
            data: None,
        });

        let result = contract.call_method("decimals", &[]).await;
        match result {
            Err(Error::Rpc { code, message }) => {
                assert_eq!(code, -32015);
                assert_eq!(message, "VM execution error");
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn contracts_on_different_providers_do_not_share_connections() {
        let (mainnet, mainnet_rpc) = mocked(NetworkDescriptor::celo_mainnet());
        let (testnet, testnet_rpc) = mocked(NetworkDescriptor::celo_alfajores());
        let on_mainnet = erc20(&mainnet);
        let on_testnet = erc20(&testnet);
        mainnet_rpc.push_success(&Bytes::from(U256::from(1u64).abi_encode()));
        testnet_rpc.push_success(&Bytes::from(U256::from(2u64).abi_encode()));

        let args = [DynSolValue::Address(Address::repeat_byte(9))];
        let t = on_testnet.call_method("balanceOf", &args).await.unwrap();
        let m = on_mainnet.call_method("balanceOf", &args).await.unwrap();
        assert_eq!(t, vec![DynSolValue::Uint(U256::from(2u64), 256)]);
        assert_eq!(m, vec![DynSolValue::Uint(U256::from(1u64), 256)]);
        assert_eq!(on_mainnet.chain_id(), 42220);
        assert_eq!(on_testnet.chain_id(), 44787);

        // both queues drained independently
        assert!(on_testnet.call_method("balanceOf", &args).await.is_err());
    }

    #[tokio::test]
    async fn invoke_calls_views_and_sends_the_rest() {
        let (provider, asserter) = mocked(NetworkDescriptor::celo_alfajores());
        let contract = erc20(&provider);
        let args = [
            DynSolValue::Address(Address::repeat_byte(2)),
            DynSolValue::Uint(U256::from(3u64), 256),
        ];

        assert!(matches!(
            contract.invoke("transfer", &args).await,
            Err(Error::Config(_))
        ));

        asserter.push_success(&Bytes::from(U256::from(18u8).abi_encode()));
        let hash = TxHash::repeat_byte(0xcd);
        asserter.push_success(&hash);

        let contract = contract.with_caller(Address::repeat_byte(1));
        assert_eq!(
            contract.invoke("decimals", &[]).await.unwrap(),
            Invocation::Returned(vec![DynSolValue::Uint(U256::from(18u64), 8)])
        );
        assert_eq!(
            contract.invoke("transfer", &args).await.unwrap(),
            Invocation::Submitted(hash)
        );
    }
}
