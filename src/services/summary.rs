use std::fmt::Write;
use crate::models::DashboardReport;

const NA: &str = "N/A";

/// `1234567.891` -> `$1,234,567.89`
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

fn format_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| NA.to_string())
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut out: String = name.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Plain-text dashboard for the terminal
pub fn render(report: &DashboardReport) -> String {
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "Total TVL (USD):     {}", format_usd(report.total_value_locked));
    let _ = writeln!(out, "Total Volume (USD):  {}", format_usd(report.total_volume));
    let _ = writeln!(out, "Average Turnover:    {}", format_opt(report.average_turnover, 4));

    let _ = writeln!(out, "\nTop Pools by TVL");
    let _ = writeln!(out, "  {:28} {:>18}", "Pool", "TVL (USD)");
    for pool in &report.top_pools {
        let tvl = pool.reserve_usd.map(format_usd).unwrap_or_else(|| NA.to_string());
        let _ = writeln!(out, "  {:28} {:>18}", truncate(&pool.name, 28), tvl);
    }

    let _ = writeln!(out, "\nTurnover Ratio (24h Volume / TVL)");
    for row in &report.turnover {
        let _ = writeln!(
            out,
            "  {:28} {:>12}",
            truncate(&row.name, 28),
            format_opt(row.turnover_ratio, 4)
        );
    }

    let _ = writeln!(out, "\nLiquidity Utilization (TVL / FDV)");
    for row in &report.utilization {
        let _ = writeln!(
            out,
            "  {:28} {:>12}",
            truncate(&row.name, 28),
            format_opt(row.liquidity_utilization, 6)
        );
    }

    let _ = writeln!(out, "\nTraders Summary");
    let _ = writeln!(
        out,
        "  {:28} {:>8} {:>8} {:>8} {:>8}",
        "Pool", "Buys", "Sells", "Buyers", "Sellers"
    );
    for row in &report.traders {
        let _ = writeln!(
            out,
            "  {:28} {:>8} {:>8} {:>8} {:>8}",
            truncate(&row.name, 28),
            row.total_buys,
            row.total_sells,
            row.total_buyers,
            row.total_sellers
        );
    }

    let _ = writeln!(out, "\nNumber of Pools per DEX");
    for row in &report.pools_per_dex {
        let _ = writeln!(
            out,
            "  {:28} {:>6}",
            row.dex.as_deref().unwrap_or(NA),
            row.num_pools
        );
    }

    out
}
