use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::{CallerAdded, CallerRemoved};
use crate::state::{CallerRecord, Controller};

#[derive(Accounts)]
#[instruction(caller: Pubkey)]
pub struct AddCaller<'info> {
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
        space = 8 + CallerRecord::INIT_SPACE,
        seeds = [CALLER_SEED, caller.as_ref()],
        bump
    )]
    pub caller_record: Account<'info, CallerRecord>,

    pub system_program: Program<'info, System>,
}

pub fn add_caller(ctx: Context<AddCaller>, caller: Pubkey) -> Result<()> {
    ctx.accounts
        .controller
        .config
        .authorize(&ctx.accounts.governance.key(), KswapError::NotGovernanceCaller)?;

    let record = &mut ctx.accounts.caller_record;
    record.caller = caller;
    record.allowed = true;
    record.bump = ctx.bumps.caller_record;

    emit!(CallerAdded { caller });
    msg!("Caller allowed: {}", caller);
    Ok(())
}

#[derive(Accounts)]
pub struct RemoveCaller<'info> {
    pub governance: Signer<'info>,

    #[account(
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

    #[account(
        mut,
        seeds = [CALLER_SEED, caller_record.caller.as_ref()],
        bump = caller_record.bump
    )]
    pub caller_record: Account<'info, CallerRecord>,
}

pub fn remove_caller(ctx: Context<RemoveCaller>) -> Result<()> {
    ctx.accounts
        .controller
        .config
        .authorize(&ctx.accounts.governance.key(), KswapError::NotGovernanceCaller)?;

    let record = &mut ctx.accounts.caller_record;
    record.allowed = false;

    emit!(CallerRemoved {
        caller: record.caller,
    });
    msg!("Caller removed: {}", record.caller);
    Ok(())
}
