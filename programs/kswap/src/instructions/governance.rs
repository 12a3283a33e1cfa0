use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::*;
use crate::state::{Controller, KInfo};

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    pub governance: Signer<'info>,

    #[account(
        mut,
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,
}

pub fn set_governance(ctx: Context<UpdateConfig>, new_governance: Pubkey) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    let config = &mut ctx.accounts.controller.config;
    let old_governance = config.governance;
    config.set_governance(&caller, new_governance)?;

    emit!(GovernanceChanged {
        old_governance,
        new_governance,
    });
    msg!("Governance moved to {}", new_governance);
    Ok(())
}

pub fn set_timespan(ctx: Context<UpdateConfig>, timespan: u64) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    let config = &mut ctx.accounts.controller.config;
    let old_timespan = config.timespan;
    config.set_timespan(&caller, timespan)?;

    emit!(TimespanChanged {
        old_timespan,
        new_timespan: timespan,
    });
    msg!("Timespan: {} -> {} ms", old_timespan, timespan);
    Ok(())
}

pub fn set_k_refresh_interval(ctx: Context<UpdateConfig>, interval: i64) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    let config = &mut ctx.accounts.controller.config;
    let old_interval = config.k_refresh_interval;
    config.set_k_refresh_interval(&caller, interval)?;

    emit!(KRefreshIntervalChanged {
        old_interval,
        new_interval: interval,
    });
    msg!("K refresh interval: {} -> {} s", old_interval, interval);
    Ok(())
}

pub fn set_k_bounds(ctx: Context<UpdateConfig>, min_k: i128, max_k: i128) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    ctx.accounts
        .controller
        .config
        .set_k_bounds(&caller, min_k, max_k)?;

    emit!(KBoundsChanged { min_k, max_k });
    msg!("K bounds: [{}, {}]", min_k, max_k);
    Ok(())
}

pub fn set_destruction_amount(ctx: Context<UpdateConfig>, amount: u64) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    let config = &mut ctx.accounts.controller.config;
    let old_amount = config.destruction_amount;
    config.set_destruction_amount(&caller, amount)?;

    emit!(DestructionAmountChanged {
        old_amount,
        new_amount: amount,
    });
    msg!("Destruction amount: {} -> {}", old_amount, amount);
    Ok(())
}

pub fn set_k_table(ctx: Context<UpdateConfig>, k_table: Pubkey) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    let config = &mut ctx.accounts.controller.config;
    let old_k_table = config.k_table;
    config.set_k_table(&caller, k_table)?;

    emit!(KTableChanged {
        old_k_table,
        new_k_table: k_table,
    });
    msg!("K table: {}", k_table);
    Ok(())
}

pub fn set_oracle_fee_collector(ctx: Context<UpdateConfig>, collector: Pubkey) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    let config = &mut ctx.accounts.controller.config;
    let old_collector = config.oracle_fee_collector;
    config.set_oracle_fee_collector(&caller, collector)?;

    emit!(FeeCollectorChanged {
        old_collector,
        new_collector: collector,
    });
    msg!("Oracle fee collector: {}", collector);
    Ok(())
}

#[derive(Accounts)]
#[instruction(token: Pubkey)]
pub struct SetTheta<'info> {
    #[account(mut)]
    pub governance: Signer<'info>,

    #[account(
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

    #[account(
        init_if_needed,
        payer = governance,
        space = 8 + KInfo::INIT_SPACE,
        seeds = [K_INFO_SEED, token.as_ref()],
        bump
    )]
    pub k_info: Account<'info, KInfo>,

    pub system_program: Program<'info, System>,
}

pub fn set_theta(ctx: Context<SetTheta>, token: Pubkey, theta: u32) -> Result<()> {
    let caller = ctx.accounts.governance.key();
    let k_info = &mut ctx.accounts.k_info;
    k_info.init_if_new(token, ctx.bumps.k_info);

    let old_theta = k_info.theta;
    ctx.accounts
        .controller
        .config
        .set_theta(&caller, k_info, theta)?;

    emit!(ThetaChanged {
        token,
        old_theta,
        new_theta: theta,
    });
    msg!("Theta for {}: {} -> {}", token, old_theta, theta);
    Ok(())
}
