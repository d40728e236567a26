//! Display formatting for prices, ratings and dates

use chrono::{DateTime, Utc};

use crate::i18n::Locale;

/// Label shown after an amount in the given currency
pub fn currency_label(currency: &str) -> &str {
    match currency.to_ascii_uppercase().as_str() {
        "XOF" | "XAF" | "FCFA" | "CFA" => "F CFA",
        "EUR" => "€",
        "USD" => "$",
        _ => currency,
    }
}

/// Group digits by thousands with a plain space, French style
pub fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a price as `1 000 000 F CFA`
pub fn format_price(amount: i64, currency: &str) -> String {
    format!("{} {}", group_thousands(amount), currency_label(currency))
}

/// Format an average rating with one decimal (`4,5` in French, `4.5` in English)
pub fn format_rating(average: f64, locale: Locale) -> String {
    let text = format!("{:.1}", average);
    match locale {
        Locale::Fr => text.replace('.', ","),
        Locale::En => text,
    }
}

/// Short relative date for listing cards ("il y a 3 jours")
pub fn time_ago(when: DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    let elapsed = now.signed_duration_since(when);
    let minutes = elapsed.num_minutes().max(0);
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    match locale {
        Locale::Fr => match (minutes, hours, days) {
            (0, _, _) => "à l'instant".to_string(),
            (m, 0, _) => format!("il y a {} min", m),
            (_, h, 0) => format!("il y a {} h", h),
            (_, _, 1) => "hier".to_string(),
            (_, _, d) if d < 30 => format!("il y a {} jours", d),
            _ => when.format("%d/%m/%Y").to_string(),
        },
        Locale::En => match (minutes, hours, days) {
            (0, _, _) => "just now".to_string(),
            (m, 0, _) => format!("{} min ago", m),
            (_, h, 0) => format!("{} h ago", h),
            (_, _, 1) => "yesterday".to_string(),
            (_, _, d) if d < 30 => format!("{} days ago", d),
            _ => when.format("%Y-%m-%d").to_string(),
        },
    }
}
