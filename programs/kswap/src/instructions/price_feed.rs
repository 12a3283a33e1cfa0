use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::{PriceFed, PriceFeedCreated};
use crate::state::{Controller, FeedKind, FeedState, PriceFeed};

#[derive(Accounts)]
pub struct InitializePriceFeed<'info> {
    #[account(mut)]
    pub governance: Signer<'info>,

    #[account(
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

    /// Token the feed prices
    pub token_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = governance,
        space = 8 + PriceFeed::INIT_SPACE,
        seeds = [PRICE_FEED_SEED, token_mint.key().as_ref()],
        bump
    )]
    pub price_feed: Box<Account<'info, PriceFeed>>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_price_feed(
    ctx: Context<InitializePriceFeed>,
    kind: FeedKind,
    feeder: Pubkey,
    fee_collector: Pubkey,
    query_fee: u64,
) -> Result<()> {
    ctx.accounts
        .controller
        .config
        .authorize(&ctx.accounts.governance.key(), KswapError::NotAuthorized)?;

    let token = ctx.accounts.token_mint.key();
    let feed = &mut ctx.accounts.price_feed;
    feed.bump = ctx.bumps.price_feed;
    feed.token = token;
    feed.feeder = feeder;
    feed.fee_collector = fee_collector;
    feed.query_fee = query_fee;
    feed.state = FeedState::empty(kind);

    emit!(PriceFeedCreated {
        price_feed: feed.key(),
        token,
        feeder,
        query_fee,
    });
    msg!("Price feed for {} created ({:?})", token, kind);
    Ok(())
}

#[derive(Accounts)]
pub struct FeedPrice<'info> {
    pub feeder: Signer<'info>,

    #[account(
        mut,
        seeds = [PRICE_FEED_SEED, price_feed.token.as_ref()],
        bump = price_feed.bump
    )]
    pub price_feed: Box<Account<'info, PriceFeed>>,
}

pub fn feed_price(ctx: Context<FeedPrice>, eth_amount: u128, erc20_amount: u128) -> Result<()> {
    let slot = Clock::get()?.slot;
    let feeder = ctx.accounts.feeder.key();
    let feed = &mut ctx.accounts.price_feed;
    feed.feed(&feeder, eth_amount, erc20_amount, slot)?;

    emit!(PriceFed {
        token: feed.token,
        eth_amount,
        erc20_amount,
        slot,
    });
    Ok(())
}
