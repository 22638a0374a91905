use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{generate_id, Payout, Wallet};

/// Credited for every accepted response. Also the cash-out unit.
pub const REWARD_PER_SUBMISSION: Decimal = Decimal::ONE_HUNDRED;

impl Wallet {
    pub fn record_submission(&self) -> Wallet {
        Wallet {
            balance: self.balance + REWARD_PER_SUBMISSION,
            payouts: self.payouts.clone(),
        }
    }

    /// Largest multiple of the reward that fits in the balance.
    pub fn withdrawable(&self) -> Decimal {
        (self.balance / REWARD_PER_SUBMISSION).floor() * REWARD_PER_SUBMISSION
    }

    pub fn total_paid_out(&self) -> Decimal {
        self.payouts.iter().map(|payout| payout.amount).sum()
    }

    pub fn cash_out(&self) -> Result<(Wallet, Payout)> {
        self.cash_out_at(Utc::now())
    }

    pub fn cash_out_at(&self, now: DateTime<Utc>) -> Result<(Wallet, Payout)> {
        if self.balance < REWARD_PER_SUBMISSION {
            return Err(Error::InsufficientBalance {
                balance: self.balance,
                minimum: REWARD_PER_SUBMISSION,
            });
        }

        let amount = self.withdrawable();
        let payout = Payout {
            id: generate_id(),
            amount,
            timestamp: now,
        };
        debug!("cashing out {} of {}", amount, self.balance);

        let mut payouts = Vec::with_capacity(self.payouts.len() + 1);
        payouts.push(payout.clone());
        payouts.extend(self.payouts.iter().cloned());

        let wallet = Wallet {
            balance: self.balance - amount,
            payouts,
        };

        Ok((wallet, payout))
    }

    pub fn check(&self) -> Result<()> {
        if self.balance < Decimal::ZERO {
            return Err(Error::ImportFormat(format!(
                "negative wallet balance {}",
                self.balance
            )));
        }

        for payout in &self.payouts {
            let positive = payout.amount > Decimal::ZERO;
            let whole = (payout.amount % REWARD_PER_SUBMISSION).is_zero();
            if !positive || !whole {
                return Err(Error::ImportFormat(format!(
                    "payout {} has invalid amount {}",
                    payout.id, payout.amount
                )));
            }
        }

        Ok(())
    }
}
