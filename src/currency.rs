//! Currency Display
//!
//! Display-only formatting. Nothing here feeds back into stored amounts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    pub code: String,
    pub symbol: String,
    pub decimals: usize,
    pub thousands_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::gbp()
    }
}

impl CurrencyFormat {
    pub fn gbp() -> Self {
        Self {
            code: "GBP".to_string(),
            symbol: "£".to_string(),
            decimals: 2,
            thousands_separator: ',',
        }
    }

    /// Symbol-prefixed, grouped, fixed decimals. Negative amounts lead with `-`.
    pub fn format(&self, amount: f64) -> String {
        let fixed = format!("{:.*}", self.decimals, amount.abs());
        let (whole, fraction) = match fixed.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(digit);
        }

        let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };
        match fraction {
            Some(f) => format!("{}{}{}.{}", sign, self.symbol, grouped, f),
            None => format!("{}{}{}", sign, self.symbol, grouped),
        }
    }
}

/// Format as pounds sterling, e.g. `£1,435.00`.
pub fn format_gbp(amount: f64) -> String {
    CurrencyFormat::gbp().format(amount)
}
