//! Display helpers for balances, market caps and PnL

/// `$1.23B`, `$4.56M`, otherwise whole dollars with separators
pub fn format_market_cap(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("${:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else {
        format!("${}", group_thousands(value.round()))
    }
}

/// Dollars with separators and up to two decimals: `$1,234.5`
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc();
    let frac = (cents - whole * 100.0) as u64;
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };

    let mut out = format!("{sign}${}", group_thousands(whole));
    if frac > 0 {
        let decimals = format!("{frac:02}");
        out.push('.');
        out.push_str(decimals.trim_end_matches('0'));
    }
    out
}

/// Signed percent, losses capped at -100%: `+2.00%`, `-100.00%`
pub fn format_pnl_percent(pnl_multiple: f64) -> String {
    let percent = pnl_multiple.max(-1.0) * 100.0;
    let sign = if percent >= 0.0 { "+" } else { "" };
    format!("{sign}{percent:.2}%")
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}
