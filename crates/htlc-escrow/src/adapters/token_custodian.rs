//! In-Memory Token Custodian Adapter
//!
//! Implements `TokenCustodian` over per-token balance and allowance maps.
//! Stands in for a real token contract in tests, demos and simulations.

use crate::domain::{Address, TokenError};
use crate::ports::outbound::TokenCustodian;
use async_trait::async_trait;
use parking_lot::RwLock;
use primitive_types::U256;
use std::collections::HashMap;
use tracing::debug;

/// Balances and allowances of a single token.
#[derive(Clone, Debug, Default)]
struct TokenBook {
    balances: HashMap<Address, U256>,
    /// (owner, spender) -> remaining allowance.
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl TokenBook {
    fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Debit `from` and credit `to`, or change nothing.
    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        let from_balance = self.balance(&from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance);
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(from, from_balance - amount);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}

/// ERC20-style custodian holding any number of tokens in memory.
///
/// Allowance is checked before balance. An allowance of `U256::MAX` is
/// never decremented.
#[derive(Default)]
pub struct InMemoryTokenCustodian {
    tokens: RwLock<HashMap<Address, TokenBook>>,
}

impl InMemoryTokenCustodian {
    /// Create an empty custodian.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new tokens for `account`, registering `token` if needed.
    pub fn mint(&self, token: Address, account: Address, amount: U256) -> Result<(), TokenError> {
        let mut tokens = self.tokens.write();
        let book = tokens.entry(token).or_default();
        let supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = book.balance(&account) + amount;
        book.total_supply = supply;
        book.balances.insert(account, balance);
        Ok(())
    }

    /// Total supply of `token`.
    pub fn total_supply(&self, token: &Address) -> Result<U256, TokenError> {
        self.tokens
            .read()
            .get(token)
            .map(|book| book.total_supply)
            .ok_or(TokenError::UnknownToken(*token))
    }

    /// Remaining allowance of `spender` over `owner`'s tokens.
    pub fn allowance(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256, TokenError> {
        self.tokens
            .read()
            .get(token)
            .map(|book| book.allowance(owner, spender))
            .ok_or(TokenError::UnknownToken(*token))
    }
}

#[async_trait]
impl TokenCustodian for InMemoryTokenCustodian {
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let mut tokens = self.tokens.write();
        let book = tokens
            .get_mut(&token)
            .ok_or(TokenError::UnknownToken(token))?;
        book.allowances.insert((owner, spender), amount);
        Ok(())
    }

    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        owner: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        debug!(
            subsystem = "htlc",
            token = %hex::encode(token),
            amount = %amount,
            "[htlc] transfer_from"
        );

        let mut tokens = self.tokens.write();
        let book = tokens
            .get_mut(&token)
            .ok_or(TokenError::UnknownToken(token))?;

        let allowance = book.allowance(&owner, &spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance);
        }

        book.move_balance(owner, recipient, amount)?;

        if allowance != U256::MAX {
            book.allowances.insert((owner, spender), allowance - amount);
        }
        Ok(())
    }

    async fn transfer(
        &self,
        token: Address,
        from: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        debug!(
            subsystem = "htlc",
            token = %hex::encode(token),
            amount = %amount,
            "[htlc] transfer"
        );

        let mut tokens = self.tokens.write();
        let book = tokens
            .get_mut(&token)
            .ok_or(TokenError::UnknownToken(token))?;
        book.move_balance(from, recipient, amount)
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, TokenError> {
        self.tokens
            .read()
            .get(&token)
            .map(|book| book.balance(&account))
            .ok_or(TokenError::UnknownToken(token))
    }
}
