//! Property tests for fee estimation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use alloy_primitives::U256;
use proptest::prelude::*;
use vemesh::construction::{dynamic_fee_params, legacy_fee};
use vemesh::node::DynamicGasPrice;
use vemesh_chain::FeeParams;

proptest! {
    #[test]
    fn legacy_fee_grows_with_coefficient(
        gas in 21_000u64..10_000_000,
        base in 1u64..1_000_000_000_000_000,
        coef in 0u8..255,
    ) {
        let base = U256::from(base);
        prop_assert!(legacy_fee(gas, base, coef) <= legacy_fee(gas, base, coef + 1));
        prop_assert_eq!(legacy_fee(gas, base, 0), U256::from(gas) * base);
    }

    #[test]
    fn dynamic_cap_covers_base_and_tip(base in any::<u64>(), reward in any::<u64>()) {
        let price = DynamicGasPrice {
            base_fee: U256::from(base),
            reward: U256::from(reward),
        };
        match dynamic_fee_params(&price) {
            FeeParams::DynamicFee { max_priority_fee_per_gas, max_fee_per_gas } => {
                prop_assert_eq!(max_priority_fee_per_gas, price.reward);
                prop_assert!(max_fee_per_gas >= price.base_fee + price.reward);
            }
            FeeParams::Legacy { .. } => prop_assert!(false, "expected dynamic fee"),
        }
    }
}
