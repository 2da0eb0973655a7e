//! CLI 출력용 텍스트 표

use std::fmt::Write;

use crate::aggregate::{Dashboard, HistoryMonth};

/// 천 단위 구분 기호를 넣은 정수 금액
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

fn format_optional(amount: Option<f64>) -> String {
    amount.map(format_amount).unwrap_or_else(|| "-".to_string())
}

fn format_pct(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{:+.1}%", p),
        None => String::new(),
    }
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    for row in &dashboard.rows {
        let _ = writeln!(out, "[{}]", row.branch);
        for cell in &row.cells {
            if !cell.has_data {
                let _ = writeln!(out, "  {}  ({}) 미제출", cell.month, cell.currency);
                continue;
            }
            let variance = cell
                .variance
                .map(|v| {
                    let mark = if v.is_over_budget() { "초과" } else { "절감" };
                    format!(" {} {}", format_pct(Some(v.pct)), mark)
                })
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {}  ({}) 예상 {} / 실제 {}{}{}",
                cell.month,
                cell.currency,
                format_optional(cell.estimated),
                format_optional(cell.actual),
                variance,
                if cell.recently_updated { " *" } else { "" }
            );
        }
    }

    let _ = writeln!(out, "[KRW 합계]");
    for (month, total) in &dashboard.krw_totals {
        let _ = writeln!(
            out,
            "  {}  예상 {} / 실제 {}",
            month,
            format_optional(total.est),
            format_optional(total.act)
        );
    }

    out
}

pub fn render_history(branch: &str, history: &[HistoryMonth]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", branch);
    for month in history {
        if !month.has_data {
            let _ = writeln!(out, "  {}  -", month.month);
            continue;
        }
        let _ = writeln!(
            out,
            "  {}  예상 {} {} / 실제 {} {}",
            month.month,
            format_amount(month.estimated),
            format_pct(month.estimated_change_pct),
            format_amount(month.actual),
            format_pct(month.actual_change_pct),
        );
    }
    out
}
