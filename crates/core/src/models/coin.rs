use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Number of entries shown when the search box is empty.
const DEFAULT_LISTING: usize = 10;

/// Maximum number of matches returned for a non-empty query.
const MAX_MATCHES: usize = 8;

/// A coin the user can pick when recording a holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    /// Market-data identifier, lowercase (e.g., "bitcoin")
    pub id: String,

    /// Ticker, uppercase (e.g., "BTC")
    pub symbol: String,

    /// Human-readable name (e.g., "Bitcoin")
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl CoinInfo {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into().to_lowercase(),
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            icon_url: None,
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.symbol.to_lowercase().contains(query)
            || self.id.contains(query)
    }
}

/// The coin picked on a draft: just enough to build a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSelection {
    pub id: String,
    pub symbol: String,
}

impl From<&CoinInfo> for CoinSelection {
    fn from(coin: &CoinInfo) -> Self {
        Self {
            id: coin.id.clone(),
            symbol: coin.symbol.clone(),
        }
    }
}

/// The known coins a holding may be recorded against.
///
/// Free text that does not resolve to a catalog entry is never accepted
/// as a coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinCatalog {
    coins: Vec<CoinInfo>,
}

impl CoinCatalog {
    pub fn new(coins: Vec<CoinInfo>) -> Self {
        Self { coins }
    }

    /// Load a catalog from a JSON array of `{id, symbol, name, icon_url?}`.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let coins: Vec<CoinInfo> = serde_json::from_str(json)?;
        Ok(Self::new(
            coins
                .into_iter()
                .map(|c| CoinInfo {
                    icon_url: c.icon_url,
                    ..CoinInfo::new(c.id, c.symbol, c.name)
                })
                .collect(),
        ))
    }

    /// Exact lookup by market-data id.
    pub fn get(&self, id: &str) -> Option<&CoinInfo> {
        self.coins.iter().find(|c| c.id == id)
    }

    /// True if `selection` names a catalog coin with the same ticker.
    pub fn contains(&self, selection: &CoinSelection) -> bool {
        self.get(&selection.id)
            .is_some_and(|c| c.symbol.eq_ignore_ascii_case(&selection.symbol))
    }

    /// Coins for the picker dropdown.
    ///
    /// A blank query lists the first entries in catalog order; otherwise a
    /// case-insensitive substring match on name, symbol or id.
    pub fn search(&self, query: &str) -> Vec<&CoinInfo> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.coins.iter().take(DEFAULT_LISTING).collect();
        }
        self.coins
            .iter()
            .filter(|c| c.matches(&query))
            .take(MAX_MATCHES)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoinInfo> {
        self.coins.iter()
    }
}

impl Default for CoinCatalog {
    /// Commonly held coins, keyed by their CoinGecko ids.
    fn default() -> Self {
        let common = [
            ("bitcoin", "BTC", "Bitcoin"),
            ("ethereum", "ETH", "Ethereum"),
            ("tether", "USDT", "Tether"),
            ("binancecoin", "BNB", "BNB"),
            ("solana", "SOL", "Solana"),
            ("ripple", "XRP", "XRP"),
            ("usd-coin", "USDC", "USDC"),
            ("cardano", "ADA", "Cardano"),
            ("dogecoin", "DOGE", "Dogecoin"),
            ("tron", "TRX", "TRON"),
            ("avalanche-2", "AVAX", "Avalanche"),
            ("shiba-inu", "SHIB", "Shiba Inu"),
            ("polkadot", "DOT", "Polkadot"),
            ("chainlink", "LINK", "Chainlink"),
            ("matic-network", "MATIC", "Polygon"),
            ("litecoin", "LTC", "Litecoin"),
            ("uniswap", "UNI", "Uniswap"),
            ("cosmos", "ATOM", "Cosmos Hub"),
            ("stellar", "XLM", "Stellar"),
            ("near", "NEAR", "NEAR Protocol"),
            ("monero", "XMR", "Monero"),
            ("ethereum-classic", "ETC", "Ethereum Classic"),
            ("algorand", "ALGO", "Algorand"),
            ("the-sandbox", "SAND", "The Sandbox"),
            ("decentraland", "MANA", "Decentraland"),
            ("axie-infinity", "AXS", "Axie Infinity"),
        ];
        Self::new(
            common
                .iter()
                .map(|(id, sym, name)| CoinInfo::new(*id, *sym, *name))
                .collect(),
        )
    }
}
