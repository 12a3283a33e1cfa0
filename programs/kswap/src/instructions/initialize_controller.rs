use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::events::ControllerInitialized;
use crate::program::Kswap;
use crate::state::{Controller, GovernanceConfig};

#[derive(Accounts)]
pub struct InitializeController<'info> {
    /// Becomes the governance key; must be the program's upgrade authority
    #[account(mut)]
    pub governance: Signer<'info>,

    #[account(
        constraint = program.programdata_address()? == Some(program_data.key())
            @ KswapError::InvalidProgramData
    )]
    pub program: Program<'info, Kswap>,

    pub program_data: Account<'info, ProgramData>,

    #[account(
        init,
        payer = governance,
        space = 8 + Controller::INIT_SPACE,
        seeds = [CONTROLLER_SEED],
        bump
    )]
    pub controller: Account<'info, Controller>,

    pub system_program: Program<'info, System>,
}

/// Only a live upgrade authority may create the controller
pub fn require_upgrade_authority(upgrade_authority: Option<Pubkey>, signer: &Pubkey) -> Result<()> {
    let authority = upgrade_authority.ok_or(KswapError::NotUpgradeAuthority)?;
    require_keys_eq!(authority, *signer, KswapError::NotUpgradeAuthority);
    Ok(())
}

pub fn handler(
    ctx: Context<InitializeController>,
    k_table: Pubkey,
    oracle_fee_collector: Pubkey,
) -> Result<()> {
    let clock = Clock::get()?;
    let governance = ctx.accounts.governance.key();
    require_upgrade_authority(
        ctx.accounts.program_data.upgrade_authority_address,
        &governance,
    )?;
    let controller = &mut ctx.accounts.controller;

    controller.version = PROTOCOL_VERSION;
    controller.bump = ctx.bumps.controller;
    controller.config = GovernanceConfig::new(governance, k_table, oracle_fee_collector);
    controller.activated = false;
    controller.activated_at = 0;
    controller.total_queries = 0;

    emit!(ControllerInitialized {
        controller: controller.key(),
        governance,
        k_table,
        timestamp: clock.unix_timestamp,
    });

    msg!("Controller initialized, governance: {}", governance);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_upgrade_authority_initializes() {
        let authority = Pubkey::new_unique();
        assert!(require_upgrade_authority(Some(authority), &authority).is_ok());

        let e: Error = KswapError::NotUpgradeAuthority.into();
        let outsider = Pubkey::new_unique();
        assert_eq!(
            require_upgrade_authority(Some(authority), &outsider).unwrap_err(),
            e
        );
        // an immutable program has no authority left to initialize it
        assert_eq!(require_upgrade_authority(None, &authority).unwrap_err(), e);
    }
}
