//! Chat-facing rendering of explorer results (Telegram Markdown).

use serde_json::Value;
use web3_memory_types::{MarketChart, TokenSearchGroup};

pub const NO_TOKENS_FOUND: &str = "No tokens found for that symbol.";

const NOT_AVAILABLE: &str = "N/A";

pub fn format_token_response(groups: &[TokenSearchGroup]) -> String {
    if groups.is_empty() {
        return NO_TOKENS_FOUND.to_string();
    }

    let mut response = String::from("🔍 **Token Search Results:**\n\n");

    for group in groups {
        response.push_str(&format!("**{}:**\n", group.chain));
        for (index, token) in group.tokens.iter().enumerate() {
            response.push_str(&format!(
                "{}. **{}** ({})\n",
                index + 1,
                token.name.as_deref().unwrap_or("Unknown"),
                token.symbol.as_deref().unwrap_or(NOT_AVAILABLE)
            ));
            response.push_str(&format!(
                "   💰 Price: ${}\n",
                display_value(token.exchange_rate.as_ref())
            ));
            response.push_str(&format!(
                "   👥 Holders: {}\n",
                display_value(token.holder_count())
            ));
            response.push_str(&format!(
                "   📊 24h Volume: ${}\n",
                display_value(token.volume_24h.as_ref())
            ));
            response.push_str(&format!(
                "   📍 `{}`\n\n",
                token.contract_address().unwrap_or(NOT_AVAILABLE)
            ));
        }
    }

    response
}

pub fn format_chart_response(chart: &MarketChart) -> String {
    let mut response = format!("📈 **{} Market Chart (Last 7 Days):**\n\n", chart.chain);

    if let Some(supply) = chart.available_supply.as_ref().and_then(format_supply) {
        response.push_str(&format!("💎 **Supply:** {}\n\n", supply));
    }

    for day in &chart.chart_data {
        response.push_str(&format!(
            "**{}:** ${}\n",
            day.date,
            display_value(day.closing_price.as_ref())
        ));
    }

    response
}

/// Explorer numbers arrive as strings or JSON numbers; null, empty and zero render as N/A
fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => NOT_AVAILABLE.to_string(),
        Some(other) => other.to_string(),
    }
}

/// A supply line is shown for any non-empty string and any non-zero number.
/// Text that is not a number renders as "NaN".
fn format_supply(value: &Value) -> Option<String> {
    let parsed = match value {
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.as_f64(),
        _ => return None,
    };

    match parsed {
        Some(n) if n.is_finite() => Some(format_grouped(n)),
        _ => Some("NaN".to_string()),
    }
}

/// Thousands separators and at most three fraction digits ("1,234,567.891")
fn format_grouped(n: f64) -> String {
    let fixed = format!("{:.3}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if n < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
