use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::Activated;
use crate::state::Controller;

#[derive(Accounts)]
pub struct Activate<'info> {
    #[account(mut)]
    pub governance: Signer<'info>,

    #[account(
        mut,
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

    /// Receives the activation payment
    #[account(
        mut,
        address = controller.config.oracle_fee_collector @ KswapError::InvalidFeeCollector
    )]
    pub oracle_fee_collector: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Activate>) -> Result<()> {
    let clock = Clock::get()?;
    let caller = ctx.accounts.governance.key();

    let first = ctx
        .accounts
        .controller
        .activate(&caller, clock.unix_timestamp)?;
    if !first {
        msg!("Controller already active");
        return Ok(());
    }

    let amount = ctx.accounts.controller.config.destruction_amount;
    if amount > 0 {
        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.governance.to_account_info(),
                    to: ctx.accounts.oracle_fee_collector.to_account_info(),
                },
            ),
            amount,
        )?;
    }

    emit!(Activated {
        governance: caller,
        amount,
        timestamp: clock.unix_timestamp,
    });
    msg!("Controller activated, paid {} lamports", amount);

    Ok(())
}
