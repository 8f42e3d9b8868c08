//! Exchange configuration.
//!
//! A JSON document listing the markets to create and, optionally, balances
//! to seed the ledger with:
//!
//! ```json
//! {
//!   "markets": [{
//!     "id": 0, "symbol": "WETH_USDC",
//!     "base_token": "0x...", "quote_token": "0x...",
//!     "base_decimals": 18, "quote_decimals": 6,
//!     "size_tick_exp": 14, "price_tick_exp": 4
//!   }],
//!   "deposits": [{ "account": "0x...", "market": 0, "base": "1.5", "quote": "3000" }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::MarketInfo;
use crate::error::ConfigError;
use crate::router::Exchange;
use crate::settlement::{InMemoryLedger, Ledger};
use crate::types::units::{
    amount_base_from_human, amount_from_human, human_amount, human_price, price_base_from_human, UnitsError,
};
use crate::types::{Address, Swap, Ticks};

/// One market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub id: u8,
    pub symbol: String,
    pub base_token: Address,
    pub quote_token: Address,
    pub base_decimals: u32,
    pub quote_decimals: u32,
    pub size_tick_exp: u32,
    pub price_tick_exp: u32,
}

impl MarketConfig {
    pub fn ticks(&self) -> Result<Ticks, ConfigError> {
        Ticks::from_exponents(self.size_tick_exp, self.price_tick_exp, self.base_decimals)
            .ok_or(ConfigError::InvalidTicks(self.id))
    }

    pub fn info(&self) -> Result<MarketInfo, ConfigError> {
        Ok(MarketInfo {
            id: self.id,
            base_token: self.base_token,
            quote_token: self.quote_token,
            ticks: self.ticks()?,
        })
    }

    /// Human size, e.g. `"0.25"`, in base units of this market.
    pub fn amount_base(&self, human: &str) -> Result<u64, UnitsError> {
        amount_base_from_human(human, self.base_decimals, self.size_tick_exp)
    }

    /// Human price, e.g. `"1850.5"`, in base units of this market.
    pub fn price_base(&self, human: &str) -> Result<u64, UnitsError> {
        price_base_from_human(human, self.quote_decimals, self.price_tick_exp)
    }

    /// A swap in token units rather than raw amounts. `None` if an amount
    /// does not fit a decimal.
    pub fn human_fill(&self, swap: &Swap) -> Option<HumanFill> {
        Some(HumanFill {
            ask_id: swap.ask_id,
            bid_id: swap.bid_id,
            size: human_amount(swap.amount0, self.base_decimals)?.to_string(),
            price: human_price(swap.amount0, swap.amount1, self.base_decimals, self.quote_decimals)?.to_string(),
        })
    }
}

/// A fill as shown to people: size in base tokens, price in quote per base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HumanFill {
    pub ask_id: u32,
    pub bid_id: u32,
    pub size: String,
    pub price: String,
}

/// Initial balance of one account in one market's tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositConfig {
    pub account: Address,
    pub market: u8,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub markets: Vec<MarketConfig>,
    #[serde(default)]
    pub deposits: Vec<DepositConfig>,
}

impl ExchangeConfig {
    /// Load configuration from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn market(&self, id: u8) -> Option<&MarketConfig> {
        self.markets.iter().find(|m| m.id == id)
    }

    pub fn market_by_symbol(&self, symbol: &str) -> Option<&MarketConfig> {
        self.markets.iter().find(|m| m.symbol == symbol)
    }

    /// Create every configured market on `ledger`.
    pub fn build<L: Ledger + Clone>(&self, ledger: L) -> Result<Exchange<L>, ConfigError> {
        let mut exchange = Exchange::new(ledger);
        for market in &self.markets {
            exchange.create_market(market.info()?)?;
        }
        Ok(exchange)
    }

    /// Credit the configured deposits to `ledger`.
    pub fn seed(&self, ledger: &InMemoryLedger) -> Result<(), ConfigError> {
        for deposit in &self.deposits {
            let market = self
                .market(deposit.market)
                .ok_or(ConfigError::UnknownMarket(deposit.market))?;
            if let Some(human) = &deposit.base {
                let amount = amount_from_human(human, market.base_decimals)?;
                ledger.deposit(market.base_token, deposit.account, amount);
            }
            if let Some(human) = &deposit.quote {
                let amount = amount_from_human(human, market.quote_decimals)?;
                ledger.deposit(market.quote_token, deposit.account, amount);
            }
            tracing::debug!(account = %deposit.account, market = deposit.market, "deposit seeded");
        }
        Ok(())
    }
}
