use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::KswapError;
use crate::math::FixedPoint128;

/// Baseline K coefficients indexed by (elapsed-time bucket, volatility bucket).
///
/// Each cell is an append-only slot: it starts empty and may be written exactly once.
/// The account is too large for an `init` CPI, so it is allocated client-side and
/// bound with `initialize_k_table`.
#[account(zero_copy)]
pub struct KTable {
    /// Key allowed to write cells
    pub authority: Pubkey,

    /// Controller this table belongs to
    pub controller: Pubkey,

    /// 64.64 values, little endian
    pub cells: [[u8; 16]; K_TABLE_CELLS],

    /// Presence bitmap, one bit per cell
    pub set_bits: [u8; K_TABLE_BITMAP_BYTES],

    /// Number of cells written
    pub set_count: u32,

    /// Reserved for future upgrades
    pub _reserved: [u8; 32],
}

impl KTable {
    pub const SPACE: usize = 8 + std::mem::size_of::<KTable>();

    fn index(t_index: u8, sigma_index: u8) -> Result<usize> {
        let (t, s) = (t_index as usize, sigma_index as usize);
        require!(
            t < T_BUCKETS && s < SIGMA_BUCKETS,
            KswapError::IndexOutOfRange
        );
        Ok(t * SIGMA_BUCKETS + s)
    }

    fn is_set(bits: &[u8; K_TABLE_BITMAP_BYTES], i: usize) -> bool {
        bits[i / 8] & (1 << (i % 8)) != 0
    }

    fn mark(bits: &mut [u8; K_TABLE_BITMAP_BYTES], i: usize) {
        bits[i / 8] |= 1 << (i % 8);
    }

    /// Stored value, `None` if the cell was never written
    pub fn slot(&self, t_index: u8, sigma_index: u8) -> Result<Option<FixedPoint128>> {
        let i = Self::index(t_index, sigma_index)?;
        if !Self::is_set(&self.set_bits, i) {
            return Ok(None);
        }
        Ok(Some(FixedPoint128::from_raw(i128::from_le_bytes(
            self.cells[i],
        ))))
    }

    /// Stored value, zero if the cell was never written
    pub fn get_k0(&self, t_index: u8, sigma_index: u8) -> Result<FixedPoint128> {
        Ok(self
            .slot(t_index, sigma_index)?
            .unwrap_or(FixedPoint128::ZERO))
    }

    pub fn set_k0(&mut self, t_index: u8, sigma_index: u8, value: FixedPoint128) -> Result<()> {
        let i = Self::index(t_index, sigma_index)?;
        require!(!Self::is_set(&self.set_bits, i), KswapError::CellAlreadySet);
        self.write(i, value)
    }

    /// Write several cells. Every cell is validated before any is written.
    pub fn set_k0_batch(
        &mut self,
        t_indexes: &[u8],
        sigma_indexes: &[u8],
        values: &[i128],
    ) -> Result<()> {
        require!(
            t_indexes.len() == sigma_indexes.len() && t_indexes.len() == values.len(),
            KswapError::LengthMismatch
        );

        let mut pending = self.set_bits;
        for (t, s) in t_indexes.iter().zip(sigma_indexes) {
            let i = Self::index(*t, *s)?;
            require!(!Self::is_set(&pending, i), KswapError::CellAlreadySet);
            Self::mark(&mut pending, i);
        }

        for ((t, s), v) in t_indexes.iter().zip(sigma_indexes).zip(values) {
            let i = Self::index(*t, *s)?;
            self.write(i, FixedPoint128::from_raw(*v))?;
        }
        Ok(())
    }

    fn write(&mut self, i: usize, value: FixedPoint128) -> Result<()> {
        self.cells[i] = value.raw().to_le_bytes();
        Self::mark(&mut self.set_bits, i);
        self.set_count = self
            .set_count
            .checked_add(1)
            .ok_or(KswapError::MathOverflow)?;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.set_count as usize == K_TABLE_CELLS
    }
}
