//! Transaction variants exchanged between peers and recorded in blocks

use serde::{Deserialize, Serialize};

/// Participant name reserved for the front-running role
pub const SNIPER_ACTOR: &str = "sniper";

/// Move `amount` of `token` from `sender` to `recipient`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub sender: String,
    pub recipient: String,
    pub token: String,
    pub amount: f64,
}

/// Deposit both legs of a pair into the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddLiquidity {
    pub provider: String,
    pub token_a: String,
    pub amount_a: f64,
    pub token_b: String,
    pub amount_b: f64,
}

/// Trade `amount_in` of `from_token` against the pool for `to_token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    pub trader: String,
    pub from_token: String,
    pub to_token: String,
    pub amount_in: f64,
}

/// A pending or finalized transaction
///
/// Serialized with a `kind` discriminator so a block's transaction list
/// decodes back into the same variants on every peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    Transfer(Transfer),
    AddLiquidity(AddLiquidity),
    Swap(Swap),
}

impl Transaction {
    pub fn transfer(sender: &str, recipient: &str, token: &str, amount: f64) -> Self {
        Transaction::Transfer(Transfer {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            token: token.to_string(),
            amount,
        })
    }

    pub fn add_liquidity(provider: &str, token_a: &str, amount_a: f64, token_b: &str, amount_b: f64) -> Self {
        Transaction::AddLiquidity(AddLiquidity {
            provider: provider.to_string(),
            token_a: token_a.to_string(),
            amount_a,
            token_b: token_b.to_string(),
            amount_b,
        })
    }

    pub fn swap(trader: &str, from_token: &str, to_token: &str, amount_in: f64) -> Self {
        Transaction::Swap(Swap {
            trader: trader.to_string(),
            from_token: from_token.to_string(),
            to_token: to_token.to_string(),
            amount_in,
        })
    }

    /// The participant who pays for this transaction
    pub fn actor(&self) -> &str {
        match self {
            Transaction::Transfer(tx) => &tx.sender,
            Transaction::AddLiquidity(tx) => &tx.provider,
            Transaction::Swap(tx) => &tx.trader,
        }
    }

    pub fn is_add_liquidity(&self) -> bool {
        matches!(self, Transaction::AddLiquidity(_))
    }

    pub fn is_sniper_authored(&self) -> bool {
        self.actor() == SNIPER_ACTOR
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Transaction::Transfer(_) => "transfer",
            Transaction::AddLiquidity(_) => "add_liquidity",
            Transaction::Swap(_) => "swap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_per_variant() {
        assert_eq!(Transaction::transfer("a", "b", "X", 1.0).actor(), "a");
        assert_eq!(Transaction::add_liquidity("lp", "X", 1.0, "Y", 1.0).actor(), "lp");
        assert_eq!(Transaction::swap("sniper", "X", "Y", 1.0).actor(), "sniper");
        assert!(Transaction::swap("sniper", "X", "Y", 1.0).is_sniper_authored());
        assert!(!Transaction::swap("whale", "X", "Y", 1.0).is_sniper_authored());
    }

    #[test]
    fn test_tagged_encoding() {
        let tx = Transaction::swap("whale", "TokenA", "TokenB", 100.0);
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["kind"], "swap");
        assert_eq!(json["trader"], "whale");
        assert_eq!(json["amount_in"], 100.0);

        let liquidity = serde_json::to_value(Transaction::add_liquidity("user", "TokenA", 1.0, "TokenB", 2.0)).unwrap();
        assert_eq!(liquidity["kind"], "add_liquidity");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<Transaction, _> =
            serde_json::from_str(r#"{"kind":"mint","to":"x","amount":1.0}"#);
        assert!(result.is_err());
    }
}
