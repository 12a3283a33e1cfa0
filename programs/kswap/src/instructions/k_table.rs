use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::{K0Set, KTableInitialized};
use crate::math::FixedPoint128;
use crate::state::{Controller, KTable};

#[derive(Accounts)]
pub struct InitializeKTable<'info> {
    pub governance: Signer<'info>,

    #[account(
        seeds = [CONTROLLER_SEED],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

    /// Allocated by the client with `KTable::SPACE` bytes
    #[account(zero)]
    pub k_table: AccountLoader<'info, KTable>,
}

pub fn initialize_k_table(ctx: Context<InitializeKTable>) -> Result<()> {
    let governance = ctx.accounts.governance.key();
    ctx.accounts
        .controller
        .config
        .authorize(&governance, KswapError::NotGovernanceKTable)?;

    let mut table = ctx.accounts.k_table.load_init()?;
    table.authority = governance;
    table.controller = ctx.accounts.controller.key();

    emit!(KTableInitialized {
        k_table: ctx.accounts.k_table.key(),
        authority: governance,
    });
    msg!("K table initialized: {}", ctx.accounts.k_table.key());
    Ok(())
}

#[derive(Accounts)]
pub struct SetK0<'info> {
    pub authority: Signer<'info>,

    #[account(mut)]
    pub k_table: AccountLoader<'info, KTable>,
}

pub fn set_k0(ctx: Context<SetK0>, t_index: u8, sigma_index: u8, value: i128) -> Result<()> {
    let k_table = ctx.accounts.k_table.key();
    let mut table = ctx.accounts.k_table.load_mut()?;
    require_keys_eq!(
        table.authority,
        ctx.accounts.authority.key(),
        KswapError::NotAuthorized
    );

    table.set_k0(t_index, sigma_index, FixedPoint128::from_raw(value))?;

    emit!(K0Set {
        k_table,
        t_index,
        sigma_index,
        value,
    });
    Ok(())
}

pub fn set_k0_batch(
    ctx: Context<SetK0>,
    t_indexes: Vec<u8>,
    sigma_indexes: Vec<u8>,
    values: Vec<i128>,
) -> Result<()> {
    let k_table = ctx.accounts.k_table.key();
    let mut table = ctx.accounts.k_table.load_mut()?;
    require_keys_eq!(
        table.authority,
        ctx.accounts.authority.key(),
        KswapError::NotAuthorized
    );

    table.set_k0_batch(&t_indexes, &sigma_indexes, &values)?;

    for ((&t_index, &sigma_index), &value) in t_indexes.iter().zip(&sigma_indexes).zip(&values) {
        emit!(K0Set {
            k_table,
            t_index,
            sigma_index,
            value,
        });
    }
    msg!("Set {} K0 cells, {} of {} filled", values.len(), table.set_count, K_TABLE_CELLS);
    Ok(())
}

#[derive(Accounts)]
pub struct GetK0<'info> {
    pub k_table: AccountLoader<'info, KTable>,
}

pub fn get_k0(ctx: Context<GetK0>, t_index: u8, sigma_index: u8) -> Result<i128> {
    let table = ctx.accounts.k_table.load()?;
    Ok(table.get_k0(t_index, sigma_index)?.raw())
}
