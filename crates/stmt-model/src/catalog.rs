use crate::money::Money;

/// The account a statement belongs to, as known by the bookkeeping service.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub currency_id: Option<u64>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub current_balance: Option<Money>,
}

/// Entry of the currency catalog.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Currency {
    pub id: u64,
    pub code: String,
    pub symbol: String,
}
