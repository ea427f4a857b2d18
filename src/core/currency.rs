//! Target currencies that points can be converted into

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCurrency {
    Fiat,
    Token,
    GiftCard,
    Voucher,
}

impl TargetCurrency {
    pub const ALL: [TargetCurrency; 4] = [
        TargetCurrency::Fiat,
        TargetCurrency::Token,
        TargetCurrency::GiftCard,
        TargetCurrency::Voucher,
    ];

    /// Short unit label used when rendering amounts
    pub fn unit(&self) -> &'static str {
        match self {
            TargetCurrency::Fiat => "USD",
            TargetCurrency::Token => "TKN",
            TargetCurrency::GiftCard => "GC",
            TargetCurrency::Voucher => "VCH",
        }
    }
}

impl Display for TargetCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TargetCurrency::Fiat => "fiat",
                TargetCurrency::Token => "token",
                TargetCurrency::GiftCard => "gift-card",
                TargetCurrency::Voucher => "voucher",
            }
        )
    }
}

impl FromStr for TargetCurrency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fiat" => Ok(TargetCurrency::Fiat),
            "token" => Ok(TargetCurrency::Token),
            "gift-card" | "gift_card" | "giftcard" => Ok(TargetCurrency::GiftCard),
            "voucher" => Ok(TargetCurrency::Voucher),
            _ => Err(anyhow::anyhow!("Invalid target currency: {}", s)),
        }
    }
}
