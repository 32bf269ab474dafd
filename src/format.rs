// 💱 Currency Formatting - Presentation only
// Turns amounts into display strings; detectors never see these.

pub const CURRENCY_SYMBOLS: [&str; 7] = ["$", "R", "€", "£", "₦", "¥", "Br"];
pub const MAX_DECIMALS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimals: usize,
    pub thousands_separator: bool,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: CURRENCY_SYMBOLS[1].to_string(),
            decimals: 2,
            thousands_separator: true,
        }
    }
}

impl CurrencyFormat {
    /// `R1,234.50`; negatives keep the sign after the symbol (`R-1,234.50`)
    pub fn format(&self, value: f64) -> String {
        let decimals = self.decimals.min(MAX_DECIMALS);
        let digits = format!("{:.*}", decimals, value.abs());

        let (integer, fraction) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits.as_str(), None),
        };

        let integer = if self.thousands_separator {
            group_thousands(integer)
        } else {
            integer.to_string()
        };

        let sign = if value < 0.0 { "-" } else { "" };
        match fraction {
            Some(f) => format!("{}{}{}.{}", self.symbol, sign, integer, f),
            None => format!("{}{}{}", self.symbol, sign, integer),
        }
    }

    /// Next symbol in CURRENCY_SYMBOLS, wrapping around
    pub fn cycle_symbol(&mut self) {
        let current = CURRENCY_SYMBOLS
            .iter()
            .position(|s| *s == self.symbol)
            .unwrap_or(0);
        self.symbol = CURRENCY_SYMBOLS[(current + 1) % CURRENCY_SYMBOLS.len()].to_string();
    }

    /// 0 → 1 → ... → MAX_DECIMALS → 0
    pub fn cycle_decimals(&mut self) {
        self.decimals = (self.decimals + 1) % (MAX_DECIMALS + 1);
    }

    pub fn toggle_thousands_separator(&mut self) {
        self.thousands_separator = !self.thousands_separator;
    }
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let fmt = CurrencyFormat::default();
        assert_eq!(fmt.format(1234.5), "R1,234.50");
        assert_eq!(fmt.format(0.0), "R0.00");
        assert_eq!(fmt.format(999.999), "R1,000.00");
        assert_eq!(fmt.format(1_000_000.0), "R1,000,000.00");
    }

    #[test]
    fn test_negative_amounts() {
        let fmt = CurrencyFormat::default();
        assert_eq!(fmt.format(-2000.0), "R-2,000.00");
        assert_eq!(fmt.format(-12.3), "R-12.30");
    }

    #[test]
    fn test_without_separator_and_precision() {
        let fmt = CurrencyFormat {
            symbol: "$".to_string(),
            decimals: 0,
            thousands_separator: false,
        };
        assert_eq!(fmt.format(9500.4), "$9500");
        assert_eq!(fmt.format(123456.0), "$123456");

        let fmt = CurrencyFormat {
            symbol: "€".to_string(),
            decimals: 4,
            thousands_separator: true,
        };
        assert_eq!(fmt.format(1234.56789), "€1,234.5679");
    }

    #[test]
    fn test_cycles() {
        let mut fmt = CurrencyFormat::default();
        fmt.cycle_symbol();
        assert_eq!(fmt.symbol, "€");

        fmt.symbol = "Br".to_string();
        fmt.cycle_symbol();
        assert_eq!(fmt.symbol, "$");

        fmt.decimals = MAX_DECIMALS;
        fmt.cycle_decimals();
        assert_eq!(fmt.decimals, 0);

        fmt.toggle_thousands_separator();
        assert!(!fmt.thousands_separator);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
