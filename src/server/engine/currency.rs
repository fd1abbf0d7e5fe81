//! Money formatting. One policy for every place an amount is shown.

pub const DEFAULT_CURRENCY_SYMBOL: &str = "EUR";

/// Finnish convention: `1 234,50 EUR`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub decimal_separator: char,
    pub group_separator: Option<char>,
    pub symbol: Option<String>,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            group_separator: Some(' '),
            symbol: Some(DEFAULT_CURRENCY_SYMBOL.to_string()),
        }
    }
}

impl CurrencyFormat {
    pub fn with_symbol(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            symbol: (!symbol.trim().is_empty()).then(|| symbol.trim().to_string()),
            ..Default::default()
        }
    }

    pub fn format(&self, amount: f64) -> String {
        // rounding to cents first keeps -0.001 from printing as "-0,00"
        let cents = (amount * 100.0).round();
        let negative = cents < 0.0;
        let cents = cents.abs() as u64;
        let (units, fraction) = (cents / 100, cents % 100);

        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                if let Some(sep) = self.group_separator {
                    grouped.push(sep);
                }
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        let number = format!("{sign}{grouped}{}{fraction:02}", self.decimal_separator);
        match &self.symbol {
            Some(symbol) => format!("{number} {symbol}"),
            None => number,
        }
    }

    /// Plain number with at most two decimals: `2,5`
    pub fn format_decimal(&self, value: f64) -> String {
        let text = format!("{}", (value * 100.0).round() / 100.0);
        text.replace('.', &self.decimal_separator.to_string())
    }

    pub fn format_percent(&self, rate: f64) -> String {
        format!("{} %", self.format_decimal(rate))
    }
}

/// Format with the default policy
pub fn format_currency(amount: f64) -> String {
    CurrencyFormat::default().format(amount)
}
