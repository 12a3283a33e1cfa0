use anchor_lang::prelude::*;

/// Allow-list entry for accounts that may query the K engine
/// PDA Seeds: ["caller", caller]
#[account]
#[derive(InitSpace)]
pub struct CallerRecord {
    pub caller: Pubkey,
    pub allowed: bool,
    pub bump: u8,
}

impl CallerRecord {
    pub fn permits(&self, caller: &Pubkey) -> bool {
        self.allowed && self.caller == *caller
    }
}
