//! Integration tests for routerswap.
//!
//! Anvil-dependent tests use **testcontainers** to spin up a Docker-based
//! Anvil node automatically.
//!
//! ```bash
//! # Run everything (Docker must be available):
//! cargo test -p routerswap-integration-tests -- --include-ignored
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::{Address, U256};
    use routerswap_core::{min_output, SwapConfig};
    use routerswap_evm::{
        CancellationToken, ClientError, ConfirmationPolicy, EvmAdapter, ExecutionClient, Node,
        QueryClient,
    };
    use routerswap_signer::{LocalSigner, Signer};
    use rust_decimal::Decimal;
    use testcontainers::{
        core::{IntoContainerPort, WaitFor},
        runners::SyncRunner,
        Container, GenericImage, ImageExt,
    };

    /// Anvil default account 0.
    const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Spins up a Docker Anvil container and returns `(container, rpc_url)`.
    /// The container is dropped (and removed) when it goes out of scope.
    fn start_anvil() -> (Container<GenericImage>, String) {
        let image = GenericImage::new("ghcr.io/foundry-rs/foundry", "latest")
            .with_exposed_port(8545.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Listening on"))
            .with_entrypoint("anvil")
            .with_cmd(vec![
                "--host".to_string(),
                "0.0.0.0".to_string(),
                "--port".to_string(),
                "8545".to_string(),
                "--chain-id".to_string(),
                "31337".to_string(),
            ]);

        let container = image.start().expect("Docker must be available to run Anvil tests");
        let host_port = container.get_host_port_ipv4(8545).expect("failed to get mapped port");
        let url = format!("http://127.0.0.1:{}", host_port);
        (container, url)
    }

    fn anvil_client(url: &str) -> ExecutionClient<EvmAdapter, LocalSigner> {
        let adapter = EvmAdapter::new(url).expect("should connect to Anvil");
        let signer = LocalSigner::from_hex(ANVIL_KEY).unwrap();
        ExecutionClient::new(adapter, signer, Address::repeat_byte(0x7a), SwapConfig::default())
            .unwrap()
            .with_confirmation(ConfirmationPolicy {
                timeout: Duration::from_secs(30),
                poll_interval: Duration::from_millis(200),
            })
    }

    // -----------------------------------------------------------------
    // No node needed
    // -----------------------------------------------------------------

    #[test]
    fn unreachable_node_fails_before_signing() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = anvil_client("http://127.0.0.1:1");
            let err = client
                .approve(
                    Address::repeat_byte(0xa0),
                    client.router(),
                    U256::from(1u64),
                    &CancellationToken::new(),
                )
                .await
                .unwrap_err();
            match err {
                ClientError::Node { operation, .. } => assert_eq!(operation, "approve"),
                other => panic!("expected Node error, got {other:?}"),
            }
        });
    }

    #[test]
    fn anvil_key_derives_default_account() {
        let signer = LocalSigner::from_hex(&format!("0x{ANVIL_KEY}")).unwrap();
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(signer.address(), expected);
    }

    // -----------------------------------------------------------------
    // Anvil via testcontainers
    // -----------------------------------------------------------------

    #[test]
    #[ignore]
    fn chain_state_from_anvil() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let adapter = EvmAdapter::new(&anvil_url).unwrap();
            assert_eq!(adapter.chain_id().await.unwrap(), 31337);

            let signer = LocalSigner::from_hex(ANVIL_KEY).unwrap();
            assert_eq!(adapter.transaction_count(signer.address()).await.unwrap(), 0);
            assert!(adapter.gas_price().await.unwrap() > 0);
        });
    }

    /// Anvil has no contracts deployed, so calls land on plain accounts: they
    /// succeed and return no data. That is enough to check that the node
    /// accepts our EIP-155 signatures and that nonces advance per step.
    #[test]
    #[ignore]
    fn wrap_then_approve_is_accepted_and_mined() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = anvil_client(&anvil_url);
            let cancel = CancellationToken::new();
            let token = Address::repeat_byte(0xc0);
            let amount = U256::from(1_000_000_000_000_000u64);

            let wrap = client.wrap_native(token, amount, &cancel).await.unwrap();
            assert!(wrap.success);
            assert!(wrap.block_number.is_some());

            let approve = client
                .approve(token, client.router(), amount, &cancel)
                .await
                .expect("approve needs no token balance");
            assert!(approve.success);
            assert_ne!(wrap.tx_hash, approve.tx_hash);

            let nonce = client
                .node()
                .transaction_count(client.address())
                .await
                .unwrap();
            assert_eq!(nonce, 2);
        });
    }

    #[test]
    #[ignore]
    fn swap_uses_fixed_ceiling_and_is_mined() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = anvil_client(&anvil_url);
            let cancel = CancellationToken::new();
            let path = [Address::repeat_byte(0xc0), Address::repeat_byte(0xa0)];
            let amount_out_min = min_output(U256::from(1000u64), Decimal::ONE).unwrap();

            let outcome = client
                .swap_exact_tokens_for_tokens(U256::from(1u64), amount_out_min, &path, &cancel)
                .await
                .unwrap();
            assert!(outcome.success);
            assert!(outcome.gas_used < SwapConfig::default().swap_gas_limit);
        });
    }

    #[test]
    #[ignore]
    fn empty_call_output_is_malformed_not_zero() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let adapter = EvmAdapter::new(&anvil_url).unwrap();
            let cancel = CancellationToken::new();
            let query = QueryClient::new(&adapter);

            let err = query
                .balance_of(Address::repeat_byte(0xa0), Address::repeat_byte(0x01), &cancel)
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::MalformedResponse { .. }));

            let err = query
                .expected_amount_out(
                    Address::repeat_byte(0x7a),
                    U256::from(1u64),
                    &[Address::repeat_byte(0xc0), Address::repeat_byte(0xa0)],
                    &cancel,
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::MalformedResponse { .. }));
        });
    }
}
