use anchor_lang::prelude::*;

use crate::errors::OracleError;
use crate::oracle::*;

/// Layout of the prices a feed publishes
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum FeedState {
    LegacyList(LegacyListOracle),
    AvgPrice(AvgPriceOracle),
    ConstMock(ConstMockOracle),
}

/// Kind of feed requested at creation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedKind {
    LegacyList,
    AvgPrice,
    ConstMock,
}

impl FeedState {
    pub fn empty(kind: FeedKind) -> Self {
        match kind {
            FeedKind::LegacyList => Self::LegacyList(LegacyListOracle::default()),
            FeedKind::AvgPrice => Self::AvgPrice(AvgPriceOracle::default()),
            FeedKind::ConstMock => Self::ConstMock(ConstMockOracle::default()),
        }
    }

    fn oracle(&self) -> &dyn PriceOracle {
        match self {
            Self::LegacyList(feed) => feed,
            Self::AvgPrice(feed) => feed,
            Self::ConstMock(feed) => feed,
        }
    }
}

/// On-chain price source for one token
/// PDA Seeds: ["price_feed", token]
#[account]
#[derive(InitSpace)]
pub struct PriceFeed {
    /// Bump seed for PDA
    pub bump: u8,

    pub token: Pubkey,

    /// Only key allowed to publish prices
    pub feeder: Pubkey,

    /// Receiver of query fees
    pub fee_collector: Pubkey,

    /// Lamports charged per query
    pub query_fee: u64,

    pub state: FeedState,
}

impl PriceFeed {
    /// Publish a price at `slot`
    pub fn feed(
        &mut self,
        feeder: &Pubkey,
        eth_amount: u128,
        erc20_amount: u128,
        slot: u64,
    ) -> Result<()> {
        require_keys_eq!(*feeder, self.feeder, OracleError::NotFeeder);
        let record = PriceRecord::new(eth_amount, erc20_amount, slot)?;
        match &mut self.state {
            FeedState::LegacyList(feed) => feed.push(record),
            FeedState::AvgPrice(feed) => feed.feed(record),
            FeedState::ConstMock(feed) => feed.set(eth_amount, erc20_amount),
        }
    }

    /// Check that the attached fee covers the query fee
    pub fn check_fee(&self, max_fee: u64) -> Result<()> {
        require!(max_fee >= self.query_fee, OracleError::InsufficientFee);
        Ok(())
    }
}

impl PriceOracle for PriceFeed {
    fn latest_sample(&self, token: &Pubkey, current_slot: u64) -> Result<PriceSample> {
        require_keys_eq!(*token, self.token, OracleError::MalformedToken);
        self.state.oracle().latest_sample(token, current_slot)
    }
}
