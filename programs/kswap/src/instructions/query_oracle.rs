use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::KRefreshed;
use crate::k_engine::{query_k, KQuote};
use crate::math::QueryHint;
use crate::state::{CallerRecord, Controller, KInfo, KInfoView, KTable, PriceFeed};

/// Accounts every K query needs. Embedded by the pool instructions.
#[derive(Accounts)]
pub struct OracleQuery<'info> {
    /// Pays the query fee and any new K info account
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Box<Account<'info, Controller>>,

    #[account(address = controller.config.k_table @ KswapError::InvalidKTable)]
    pub k_table: AccountLoader<'info, KTable>,

    #[account(
        seeds = [PRICE_FEED_SEED, price_feed.token.as_ref()],
        bump = price_feed.bump
    )]
    pub price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + KInfo::INIT_SPACE,
        seeds = [K_INFO_SEED, price_feed.token.as_ref()],
        bump
    )]
    pub k_info: Box<Account<'info, KInfo>>,

    /// Receives the query fee
    #[account(
        mut,
        address = price_feed.fee_collector @ KswapError::InvalidFeeCollector
    )]
    pub fee_collector: SystemAccount<'info>,

    /// Allow-list entry of the querying caller
    pub caller_record: Account<'info, CallerRecord>,

    pub system_program: Program<'info, System>,
}

impl<'info> OracleQuery<'info> {
    /// Authorize `caller`, forward the query fee and look up K.
    pub fn query(
        &mut self,
        caller: &Pubkey,
        account: Pubkey,
        hint: &QueryHint,
        max_fee: u64,
        k_info_bump: u8,
    ) -> Result<KQuote> {
        let fee = check_query(
            &self.caller_record,
            caller,
            &self.controller,
            &self.price_feed,
            max_fee,
        )?;
        if fee > 0 {
            system_program::transfer(
                CpiContext::new(
                    self.system_program.to_account_info(),
                    system_program::Transfer {
                        from: self.payer.to_account_info(),
                        to: self.fee_collector.to_account_info(),
                    },
                ),
                fee,
            )?;
        }

        let token = self.price_feed.token;
        self.k_info.init_if_new(token, k_info_bump);

        let clock = Clock::get()?;
        let quote = {
            let table = self.k_table.load()?;
            query_k(
                &self.controller,
                &table,
                &mut self.k_info,
                &**self.price_feed,
                &token,
                hint,
                clock.slot,
                clock.unix_timestamp,
            )?
        };

        self.controller.total_queries = self.controller.total_queries.saturating_add(1);

        if quote.refreshed {
            emit!(KRefreshed {
                token,
                account,
                k: quote.k,
                t_index: quote.t_index,
                sigma_index: quote.sigma_index,
                price_slot: quote.price_slot,
                timestamp: clock.unix_timestamp,
            });
        }

        Ok(quote)
    }
}

/// Checks that run before any lamports move: caller, then activation, then fee.
///
/// Returns the fee to forward to the feed's collector.
pub fn check_query(
    record: &CallerRecord,
    caller: &Pubkey,
    controller: &Controller,
    feed: &PriceFeed,
    max_fee: u64,
) -> Result<u64> {
    require!(record.permits(caller), KswapError::CallerNotAllowed);
    controller.require_activated()?;
    feed.check_fee(max_fee)?;
    Ok(feed.query_fee)
}

#[derive(Accounts)]
pub struct QueryOracle<'info> {
    /// Registered caller, usually a program PDA signing through CPI
    pub caller: Signer<'info>,

    pub oracle: OracleQuery<'info>,
}

pub fn handler(
    ctx: Context<QueryOracle>,
    hint: QueryHint,
    account: Pubkey,
    max_fee: u64,
) -> Result<KQuote> {
    let caller = ctx.accounts.caller.key();
    let bump = ctx.bumps.oracle.k_info;
    let quote = ctx
        .accounts
        .oracle
        .query(&caller, account, &hint, max_fee, bump)?;

    msg!(
        "K query for {}: k={} t={} sigma={}",
        ctx.accounts.oracle.price_feed.token,
        quote.k,
        quote.t_index,
        quote.sigma_index
    );

    Ok(quote)
}

#[derive(Accounts)]
#[instruction(token: Pubkey)]
pub struct GetKInfo<'info> {
    /// CHECK: may not exist yet; read only when initialized
    #[account(
        seeds = [K_INFO_SEED, token.as_ref()],
        bump
    )]
    pub k_info: UncheckedAccount<'info>,
}

pub fn get_k_info_handler(ctx: Context<GetKInfo>, _token: Pubkey) -> Result<KInfoView> {
    let data = ctx.accounts.k_info.try_borrow_data()?;
    k_info_view(&data)
}

/// Decode raw K info account data; an account not created yet reads as zeroes
fn k_info_view(data: &[u8]) -> Result<KInfoView> {
    if data.is_empty() {
        return Ok(KInfoView::default());
    }
    let k_info = KInfo::try_deserialize(&mut &data[..])?;
    Ok(k_info.view())
}
