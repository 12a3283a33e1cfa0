use anchor_lang::prelude::*;

use crate::errors::OracleError;
use crate::math::FixedPoint128;
use crate::oracle::{PriceOracle, PriceSample};

/// Fixed price that is always current and never volatile
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct ConstMockOracle {
    pub eth_amount: u128,
    pub erc20_amount: u128,
}

impl ConstMockOracle {
    pub fn set(&mut self, eth_amount: u128, erc20_amount: u128) -> Result<()> {
        require!(
            eth_amount > 0 && erc20_amount > 0,
            OracleError::InvalidPrice
        );
        self.eth_amount = eth_amount;
        self.erc20_amount = erc20_amount;
        Ok(())
    }
}

impl PriceOracle for ConstMockOracle {
    fn latest_sample(&self, _token: &Pubkey, current_slot: u64) -> Result<PriceSample> {
        require!(self.eth_amount > 0, OracleError::NoPrice);
        Ok(PriceSample {
            eth_amount: self.eth_amount,
            erc20_amount: self.erc20_amount,
            slot: current_slot,
            sigma_sq: FixedPoint128::ZERO,
        })
    }
}
