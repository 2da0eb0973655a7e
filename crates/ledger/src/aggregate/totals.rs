use std::collections::BTreeMap;

use interface::{BranchConfig, CostSubmission, TargetMonth};
use serde::{Deserialize, Serialize};

use super::index::BranchMonthIndex;
use super::rates::RateBook;

/// 월별 원화 합계. 기여한 지점이 하나도 없으면 `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KrwTotal {
    pub est: Option<f64>,
    pub act: Option<f64>,
}

impl KrwTotal {
    fn add_estimated(&mut self, amount: f64) {
        self.est = Some(self.est.unwrap_or(0.0) + amount);
    }

    fn add_actual(&mut self, amount: f64) {
        self.act = Some(self.act.unwrap_or(0.0) + amount);
    }
}

/// 예상 대비 실제 차이. 양수면 예산 초과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variance {
    pub amount: f64,
    pub pct: f64,
}

impl Variance {
    pub fn is_over_budget(&self) -> bool {
        self.amount > 0.0
    }
}

/// 예상/실제가 모두 양수일 때만 차이를 계산한다
pub fn variance(record: &CostSubmission) -> Option<Variance> {
    let estimated = record.total_estimated;
    let actual = record.total_actual;
    if estimated <= 0.0 || actual <= 0.0 {
        return None;
    }
    let amount = actual - estimated;
    Some(Variance {
        amount,
        pct: amount / estimated * 100.0,
    })
}

/// 제출 통화가 비어 있으면 지점 기본 통화
pub fn resolve_currency<'a>(submission: &'a CostSubmission, branch: &'a BranchConfig) -> &'a str {
    let currency = submission.currency.trim();
    if currency.is_empty() {
        branch.currency.as_str()
    } else {
        currency
    }
}

/// 활성 월마다 지점별 최신 제출 합계를 원화로 환산해서 더한다
///
/// 환율을 찾지 못한 지점은 그 달 합계에서 빠진다 (0으로 더하지 않음).
pub fn monthly_krw_totals(
    index: &BranchMonthIndex<'_>,
    branches: &[BranchConfig],
    active_months: &[TargetMonth],
    rates: &RateBook,
) -> BTreeMap<TargetMonth, KrwTotal> {
    let mut totals: BTreeMap<TargetMonth, KrwTotal> = BTreeMap::new();

    for &month in active_months {
        let total = totals.entry(month).or_default();

        for branch in branches {
            let Some(record) = index.get(&branch.name, month) else {
                continue;
            };
            let currency = resolve_currency(record, branch);
            let Some(rate) = rates.rate_for(month, currency) else {
                tracing::debug!(
                    "No {} rate for {}, {} excluded from KRW total",
                    currency,
                    month,
                    branch.name
                );
                continue;
            };

            if record.total_estimated > 0.0 {
                total.add_estimated(record.total_estimated * rate);
            }
            if record.total_actual > 0.0 {
                total.add_actual(record.total_actual * rate);
            }
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_branch_month_index;
    use interface::{ExchangeRate, ExchangeRateTable, Timestamp};

    fn branch(name: &str, currency: &str) -> BranchConfig {
        BranchConfig {
            name: name.to_string(),
            currency: currency.to_string(),
            ..Default::default()
        }
    }

    fn record(
        branch: &str,
        month: &str,
        currency: &str,
        estimated: f64,
        actual: f64,
    ) -> CostSubmission {
        CostSubmission {
            id: format!("{}-{}", branch, month),
            branch_name: branch.to_string(),
            target_month: month.to_string(),
            currency: currency.to_string(),
            total_estimated: estimated,
            total_actual: actual,
            submitted_at: Some(Timestamp::new(10, 0)),
            ..Default::default()
        }
    }

    fn jpy_book(year: i32, month: u32) -> RateBook {
        RateBook::from_tables(vec![ExchangeRateTable {
            year,
            month: Some(month),
            rates: vec![ExchangeRate {
                currency: "JPY".to_string(),
                rate: 900.0,
                ratio: Some(100.0),
            }],
            ..Default::default()
        }])
    }

    fn month(raw: &str) -> TargetMonth {
        raw.parse().unwrap()
    }

    #[test]
    fn test_variance_sign() {
        let over = variance(&record("A", "2025-01", "KRW", 1000.0, 1200.0)).unwrap();
        assert_eq!(over.amount, 200.0);
        assert_eq!(over.pct, 20.0);
        assert!(over.is_over_budget());

        let under = variance(&record("A", "2025-01", "KRW", 1000.0, 800.0)).unwrap();
        assert_eq!(under.amount, -200.0);
        assert_eq!(under.pct, -20.0);
        assert!(!under.is_over_budget());
    }

    #[test]
    fn test_variance_requires_both_sides() {
        assert_eq!(variance(&record("A", "2025-01", "KRW", 1000.0, 0.0)), None);
        assert_eq!(variance(&record("A", "2025-01", "KRW", 0.0, 1000.0)), None);
    }

    #[test]
    fn test_krw_totals_seoul() {
        let submissions = vec![record("Seoul", "2025-01", "KRW", 1_000_000.0, 1_100_000.0)];
        let index = build_branch_month_index(&submissions);
        let totals = monthly_krw_totals(
            &index,
            &[branch("Seoul", "KRW")],
            &[month("2025-01")],
            &RateBook::new(),
        );

        assert_eq!(totals.len(), 1);
        assert_eq!(
            totals[&month("2025-01")],
            KrwTotal {
                est: Some(1_000_000.0),
                act: Some(1_100_000.0),
            }
        );
    }

    #[test]
    fn test_krw_totals_converts_jpy() {
        let submissions = vec![record("Tokyo", "2025-02", "JPY", 100_000.0, 0.0)];
        let index = build_branch_month_index(&submissions);
        let totals = monthly_krw_totals(
            &index,
            &[branch("Tokyo", "JPY")],
            &[month("2025-02")],
            &jpy_book(2025, 2),
        );

        let feb = totals[&month("2025-02")];
        assert_eq!(feb.est, Some(900_000.0));
        assert_eq!(feb.act, None);
    }

    #[test]
    fn test_missing_rate_is_excluded_not_zeroed() {
        let submissions = vec![
            record("Seoul", "2025-02", "KRW", 500.0, 400.0),
            record("London", "2025-02", "GBP", 100.0, 100.0),
        ];
        let index = build_branch_month_index(&submissions);
        let branches = [branch("Seoul", "KRW"), branch("London", "GBP")];
        let totals = monthly_krw_totals(&index, &branches, &[month("2025-02")], &jpy_book(2025, 2));

        let feb = totals[&month("2025-02")];
        assert_eq!(feb.est, Some(500.0));
        assert_eq!(feb.act, Some(400.0));

        // GBP만 있는 달은 값이 없어야 한다
        let london_only = [branch("London", "GBP")];
        let totals = monthly_krw_totals(
            &index,
            &london_only,
            &[month("2025-02")],
            &jpy_book(2025, 2),
        );
        assert_eq!(totals[&month("2025-02")], KrwTotal::default());
    }

    #[test]
    fn test_blank_currency_falls_back_to_branch_default() {
        let submissions = vec![record("Tokyo", "2025-02", "", 1_000.0, 2_000.0)];
        let index = build_branch_month_index(&submissions);
        let totals = monthly_krw_totals(
            &index,
            &[branch("Tokyo", "JPY")],
            &[month("2025-02")],
            &jpy_book(2025, 2),
        );
        let feb = totals[&month("2025-02")];
        assert_eq!(feb.est, Some(9_000.0));
        assert_eq!(feb.act, Some(18_000.0));
    }

    #[test]
    fn test_every_active_month_has_a_key() {
        let submissions = vec![record("Seoul", "2025-01", "KRW", 10.0, 0.0)];
        let index = build_branch_month_index(&submissions);
        let months = [month("2025-01"), month("2025-02")];
        let totals =
            monthly_krw_totals(&index, &[branch("Seoul", "KRW")], &months, &RateBook::new());

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&month("2025-01")].est, Some(10.0));
        assert_eq!(totals[&month("2025-01")].act, None);
        assert_eq!(totals[&month("2025-02")], KrwTotal::default());
    }

    #[test]
    fn test_sums_across_branches() {
        let submissions = vec![
            record("Seoul", "2025-02", "KRW", 1_000.0, 1_500.0),
            record("Busan", "2025-02", "KRW", 2_000.0, 0.0),
            record("Tokyo", "2025-02", "JPY", 100.0, 100.0),
        ];
        let index = build_branch_month_index(&submissions);
        let branches = [
            branch("Seoul", "KRW"),
            branch("Busan", "KRW"),
            branch("Tokyo", "JPY"),
        ];
        let totals = monthly_krw_totals(&index, &branches, &[month("2025-02")], &jpy_book(2025, 2));
        let feb = totals[&month("2025-02")];
        assert_eq!(feb.est, Some(3_900.0));
        assert_eq!(feb.act, Some(2_400.0));
    }
}
