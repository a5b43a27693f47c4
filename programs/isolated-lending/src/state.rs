use anchor_lang::prelude::*;
use solana_program::hash::hashv;
use crate::constants::*;
use crate::errors::LendingError;
use crate::math::zero_floor_sub;
use crate::shares::*;

/// Global protocol configuration
#[account]
#[derive(Default, Debug)]
pub struct GlobalConfig {
    /// Protocol owner, allowed to enable LLTVs, register rate models and set fees
    pub owner: Pubkey,
    /// Receiver of fee shares minted during accrual
    pub fee_recipient: Pubkey,
    /// LLTVs markets may be created with (WAD)
    pub enabled_lltvs: Vec<u128>,
    /// Number of rate models registered so far
    pub rate_model_count: u32,
    /// Bump seed for the config PDA
    pub bump: u8,
}

impl GlobalConfig {
    pub const SIZE: usize = 8 + // discriminator
        32 + // owner
        32 + // fee_recipient
        4 + 16 * MAX_LLTVS + // enabled_lltvs
        4 +  // rate_model_count
        1;   // bump

    pub fn initialize(&mut self, owner: Pubkey, fee_recipient: Pubkey, bump: u8) -> Result<()> {
        require_keys_neq!(owner, Pubkey::default(), LendingError::ZeroAddress);

        self.owner = owner;
        self.fee_recipient = fee_recipient;
        self.enabled_lltvs = Vec::new();
        self.rate_model_count = 0;
        self.bump = bump;

        Ok(())
    }

    pub fn is_lltv_enabled(&self, lltv: u128) -> bool {
        self.enabled_lltvs.contains(&lltv)
    }

    pub fn enable_lltv(&mut self, lltv: u128) -> Result<()> {
        require_gt!(WAD, lltv, LendingError::InvalidLltv);
        require!(!self.is_lltv_enabled(lltv), LendingError::AlreadySet);
        require_gt!(MAX_LLTVS, self.enabled_lltvs.len(), LendingError::TooManyLltvs);

        self.enabled_lltvs.push(lltv);

        Ok(())
    }

    pub fn set_fee_recipient(&mut self, fee_recipient: Pubkey) -> Result<()> {
        require_keys_neq!(self.fee_recipient, fee_recipient, LendingError::AlreadySet);
        self.fee_recipient = fee_recipient;
        Ok(())
    }
}

/// Immutable description of an isolated market.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarketParams {
    /// Token lent and borrowed
    pub loan_mint: Pubkey,
    /// Token posted as collateral
    pub collateral_mint: Pubkey,
    /// Price feed quoting collateral in loan-token units
    pub oracle: Pubkey,
    /// Interest rate model account
    pub irm: Pubkey,
    /// Liquidation loan-to-value (WAD)
    pub lltv: u128,
}

impl MarketParams {
    pub const SIZE: usize = 32 * 4 + 16;

    /// Content-derived market identifier.
    pub fn id(&self) -> [u8; 32] {
        hashv(&[
            self.loan_mint.as_ref(),
            self.collateral_mint.as_ref(),
            self.oracle.as_ref(),
            self.irm.as_ref(),
            &self.lltv.to_le_bytes(),
        ])
        .to_bytes()
    }
}

/// Per-market ledger
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Market {
    /// Market identifier, `params.id()`
    pub id: [u8; 32],
    /// Immutable market parameters
    pub params: MarketParams,
    /// Loan assets owed to lenders, interest included
    pub total_supply_assets: u128,
    /// Supply shares outstanding, fee shares included
    pub total_supply_shares: u128,
    /// Loan assets owed by borrowers, interest included
    pub total_borrow_assets: u128,
    /// Borrow shares outstanding
    pub total_borrow_shares: u128,
    /// Last interest accrual timestamp
    pub last_update: i64,
    /// Share of interest retained by the protocol (WAD)
    pub fee: u128,
    /// Supply shares minted to the fee recipient, not yet claimed
    pub fee_shares: u128,
    /// Timestamp when market was created
    pub created_at: i64,
    /// Bump seed for market PDA
    pub bump: u8,
    /// Bump seed for the loan vault PDA
    pub loan_vault_bump: u8,
    /// Bump seed for the collateral vault PDA
    pub collateral_vault_bump: u8,
}

impl Market {
    pub const SIZE: usize = 8 + // discriminator
        32 + // id
        MarketParams::SIZE + // params
        16 + // total_supply_assets
        16 + // total_supply_shares
        16 + // total_borrow_assets
        16 + // total_borrow_shares
        8 +  // last_update
        16 + // fee
        16 + // fee_shares
        8 +  // created_at
        1 +  // bump
        1 +  // loan_vault_bump
        1;   // collateral_vault_bump

    pub fn initialize(
        &mut self,
        params: MarketParams,
        bump: u8,
        loan_vault_bump: u8,
        collateral_vault_bump: u8,
        now: i64,
    ) -> Result<()> {
        require!(!self.is_created(), LendingError::MarketAlreadyCreated);
        require_gt!(WAD, params.lltv, LendingError::InvalidLltv);
        require_keys_neq!(params.loan_mint, params.collateral_mint, LendingError::InvalidMarketConfig);

        self.id = params.id();
        self.params = params;
        self.total_supply_assets = 0;
        self.total_supply_shares = 0;
        self.total_borrow_assets = 0;
        self.total_borrow_shares = 0;
        self.last_update = now;
        self.fee = 0;
        self.fee_shares = 0;
        self.created_at = now;
        self.bump = bump;
        self.loan_vault_bump = loan_vault_bump;
        self.collateral_vault_bump = collateral_vault_bump;

        Ok(())
    }

    pub fn is_created(&self) -> bool {
        self.id != [0u8; 32]
    }

    pub fn ensure_created(&self) -> Result<()> {
        require!(self.is_created(), LendingError::MarketNotCreated);
        Ok(())
    }

    /// Loan assets not lent out
    pub fn liquidity(&self) -> u128 {
        zero_floor_sub(self.total_supply_assets, self.total_borrow_assets)
    }

    pub fn ensure_liquidity(&self) -> Result<()> {
        require_gte!(
            self.total_supply_assets,
            self.total_borrow_assets,
            LendingError::InsufficientLiquidity
        );
        Ok(())
    }

    /// Debt of `position` in assets, rounded up.
    pub fn borrowed_assets(&self, position: &Position) -> Result<u128> {
        to_assets_up(position.borrow_shares, self.total_borrow_assets, self.total_borrow_shares)
    }

    /// Claim of `position` on the supply pool in assets, rounded down.
    pub fn supplied_assets(&self, position: &Position) -> Result<u128> {
        to_assets_down(position.supply_shares, self.total_supply_assets, self.total_supply_shares)
    }

    pub fn set_fee(&mut self, fee: u128) -> Result<()> {
        require!(fee != self.fee, LendingError::AlreadySet);
        require_gte!(MAX_FEE, fee, LendingError::MaxFeeExceeded);
        self.fee = fee;
        Ok(())
    }

    /// Credits lender shares. Returns `(assets, shares)`.
    pub fn apply_supply(&mut self, position: &mut Position, assets: u128, shares: u128) -> Result<(u128, u128)> {
        let (assets, shares) = if assets > 0 {
            (assets, to_shares_down(assets, self.total_supply_assets, self.total_supply_shares)?)
        } else {
            (to_assets_up(shares, self.total_supply_assets, self.total_supply_shares)?, shares)
        };

        position.supply_shares = position.supply_shares
            .checked_add(shares)
            .ok_or(LendingError::MathOverflow)?;
        self.total_supply_shares = self.total_supply_shares
            .checked_add(shares)
            .ok_or(LendingError::MathOverflow)?;
        self.total_supply_assets = self.total_supply_assets
            .checked_add(assets)
            .ok_or(LendingError::MathOverflow)?;

        Ok((assets, shares))
    }

    /// Burns lender shares. Returns `(assets, shares)`.
    pub fn apply_withdraw(&mut self, position: &mut Position, assets: u128, shares: u128) -> Result<(u128, u128)> {
        let (assets, shares) = if assets > 0 {
            (assets, to_shares_up(assets, self.total_supply_assets, self.total_supply_shares)?)
        } else {
            (to_assets_down(shares, self.total_supply_assets, self.total_supply_shares)?, shares)
        };

        require_gte!(position.supply_shares, shares, LendingError::WithdrawExceedsBalance);
        require_gte!(self.liquidity(), assets, LendingError::InsufficientLiquidity);

        position.supply_shares -= shares;
        self.total_supply_shares = self.total_supply_shares
            .checked_sub(shares)
            .ok_or(LendingError::MathOverflow)?;
        self.total_supply_assets = self.total_supply_assets
            .checked_sub(assets)
            .ok_or(LendingError::MathOverflow)?;

        Ok((assets, shares))
    }

    /// Mints borrow shares. Returns `(assets, shares)`.
    ///
    /// Performs no liquidity or health check; callers decide which apply.
    pub fn apply_borrow(&mut self, position: &mut Position, assets: u128, shares: u128) -> Result<(u128, u128)> {
        let (assets, shares) = if assets > 0 {
            (assets, to_shares_up(assets, self.total_borrow_assets, self.total_borrow_shares)?)
        } else {
            (to_assets_down(shares, self.total_borrow_assets, self.total_borrow_shares)?, shares)
        };

        position.borrow_shares = position.borrow_shares
            .checked_add(shares)
            .ok_or(LendingError::MathOverflow)?;
        self.total_borrow_shares = self.total_borrow_shares
            .checked_add(shares)
            .ok_or(LendingError::MathOverflow)?;
        self.total_borrow_assets = self.total_borrow_assets
            .checked_add(assets)
            .ok_or(LendingError::MathOverflow)?;

        Ok((assets, shares))
    }

    /// Burns borrow shares. Returns `(assets, shares)`.
    pub fn apply_repay(&mut self, position: &mut Position, assets: u128, shares: u128) -> Result<(u128, u128)> {
        let (assets, shares) = if assets > 0 {
            (assets, to_shares_down(assets, self.total_borrow_assets, self.total_borrow_shares)?)
        } else {
            (to_assets_up(shares, self.total_borrow_assets, self.total_borrow_shares)?, shares)
        };

        require_gte!(position.borrow_shares, shares, LendingError::RepayExceedsDebt);

        position.borrow_shares -= shares;
        self.total_borrow_shares = self.total_borrow_shares
            .checked_sub(shares)
            .ok_or(LendingError::MathOverflow)?;
        // rounding can leave total_borrow_assets a unit short of the repaid amount
        self.total_borrow_assets = zero_floor_sub(self.total_borrow_assets, assets);

        Ok((assets, shares))
    }

    pub fn apply_supply_collateral(&mut self, position: &mut Position, assets: u128) -> Result<()> {
        position.collateral = position.collateral
            .checked_add(assets)
            .ok_or(LendingError::MathOverflow)?;
        Ok(())
    }

    pub fn apply_withdraw_collateral(&mut self, position: &mut Position, assets: u128) -> Result<()> {
        require_gte!(position.collateral, assets, LendingError::InsufficientCollateral);
        position.collateral -= assets;
        Ok(())
    }

    /// Moves unclaimed fee shares into the fee recipient's position.
    pub fn claim_fee_shares(&mut self, fee_position: &mut Position) -> Result<u128> {
        let shares = self.fee_shares;
        require_gt!(shares, 0, LendingError::ZeroAmount);

        fee_position.supply_shares = fee_position.supply_shares
            .checked_add(shares)
            .ok_or(LendingError::MathOverflow)?;
        self.fee_shares = 0;

        Ok(shares)
    }
}

/// A user's supply, debt and collateral in one market
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Position {
    /// Market this position belongs to
    pub market: Pubkey,
    /// Position owner
    pub owner: Pubkey,
    /// Claim on the supply pool
    pub supply_shares: u128,
    /// Claim on the debt pool
    pub borrow_shares: u128,
    /// Collateral in raw token units
    pub collateral: u128,
    /// Bump seed for position PDA
    pub bump: u8,
}

impl Position {
    pub const SIZE: usize = 8 + // discriminator
        32 + // market
        32 + // owner
        16 + // supply_shares
        16 + // borrow_shares
        16 + // collateral
        1;   // bump

    pub fn initialize(&mut self, market: Pubkey, owner: Pubkey, bump: u8) -> Result<()> {
        require_keys_neq!(owner, Pubkey::default(), LendingError::ZeroAddress);

        self.market = market;
        self.owner = owner;
        self.supply_shares = 0;
        self.borrow_shares = 0;
        self.collateral = 0;
        self.bump = bump;

        Ok(())
    }

    /// `init_if_needed` hands back zeroed accounts; stamp them on first use.
    pub fn initialize_if_needed(&mut self, market: Pubkey, owner: Pubkey, bump: u8) -> Result<()> {
        if self.owner == Pubkey::default() {
            self.initialize(market, owner, bump)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.supply_shares == 0 && self.borrow_shares == 0 && self.collateral == 0
    }

    pub fn has_debt(&self) -> bool {
        self.borrow_shares > 0
    }
}
