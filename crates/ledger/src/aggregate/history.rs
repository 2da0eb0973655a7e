use interface::{CostSubmission, TargetMonth, Timestamp};
use serde::{Deserialize, Serialize};

use super::index::build_branch_month_index;

/// 지점 연간 이력의 한 달
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMonth {
    pub month: TargetMonth,
    pub estimated: f64,
    pub actual: f64,
    pub has_data: bool,
    pub currency: Option<String>,
    pub submitted_at: Option<Timestamp>,
    /// 전월 대비 예상 비용 변화율 (%)
    pub estimated_change_pct: Option<f64>,
    /// 전월 대비 실제 비용 변화율 (%)
    pub actual_change_pct: Option<f64>,
}

/// 전월 대비 변화율. 두 달 모두 양수일 때만 계산한다.
pub fn month_over_month(previous: f64, current: f64) -> Option<f64> {
    if previous > 0.0 && current > 0.0 {
        Some((current - previous) / previous * 100.0)
    } else {
        None
    }
}

/// 한 지점의 1월~12월 이력 (항상 12개)
pub fn yearly_history(
    submissions: &[CostSubmission],
    branch: &str,
    year: i32,
) -> Vec<HistoryMonth> {
    let index = build_branch_month_index(
        submissions
            .iter()
            .filter(|s| s.branch_name == branch)
            .filter(|s| s.parsed_month().is_some_and(|m| m.year == year)),
    );

    let mut history: Vec<HistoryMonth> = TargetMonth::months_of(year)
        .map(|month| match index.get(branch, month) {
            Some(record) => HistoryMonth {
                month,
                estimated: record.total_estimated,
                actual: record.total_actual,
                has_data: true,
                currency: Some(record.currency.clone()).filter(|c| !c.is_empty()),
                submitted_at: record.submitted_at,
                estimated_change_pct: None,
                actual_change_pct: None,
            },
            None => HistoryMonth {
                month,
                estimated: 0.0,
                actual: 0.0,
                has_data: false,
                currency: None,
                submitted_at: None,
                estimated_change_pct: None,
                actual_change_pct: None,
            },
        })
        .collect();

    for i in 1..history.len() {
        let (previous_est, previous_act) = (history[i - 1].estimated, history[i - 1].actual);
        let current = &mut history[i];
        current.estimated_change_pct = month_over_month(previous_est, current.estimated);
        current.actual_change_pct = month_over_month(previous_act, current.actual);
    }

    history
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, branch: &str, month: &str, est: f64, act: f64, at: i64) -> CostSubmission {
        CostSubmission {
            id: id.to_string(),
            branch_name: branch.to_string(),
            target_month: month.to_string(),
            currency: "USD".to_string(),
            total_estimated: est,
            total_actual: act,
            submitted_at: Some(Timestamp::new(at, 0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_always_twelve_months() {
        let history = yearly_history(&[], "Seoul", 2025);
        assert_eq!(history.len(), 12);
        assert!(history.iter().all(|m| !m.has_data && m.estimated == 0.0 && m.actual == 0.0));
        assert_eq!(history[0].month.to_string(), "2025-01");
        assert_eq!(history[11].month.to_string(), "2025-12");
    }

    #[test]
    fn test_latest_submission_per_month() {
        let submissions = vec![
            record("1", "Seoul", "2025-02", 100.0, 90.0, 1),
            record("2", "Seoul", "2025-02", 120.0, 110.0, 2),
            record("3", "Busan", "2025-02", 999.0, 999.0, 3),
            record("4", "Seoul", "2024-02", 777.0, 777.0, 4),
        ];
        let history = yearly_history(&submissions, "Seoul", 2025);
        let feb = &history[1];
        assert!(feb.has_data);
        assert_eq!(feb.estimated, 120.0);
        assert_eq!(feb.actual, 110.0);
        assert_eq!(feb.currency.as_deref(), Some("USD"));
        assert_eq!(history.iter().filter(|m| m.has_data).count(), 1);
    }

    #[test]
    fn test_month_over_month_change() {
        let submissions = vec![
            record("1", "Seoul", "2025-01", 100.0, 200.0, 1),
            record("2", "Seoul", "2025-02", 150.0, 100.0, 1),
        ];
        let history = yearly_history(&submissions, "Seoul", 2025);
        assert_eq!(history[0].estimated_change_pct, None);
        assert_eq!(history[1].estimated_change_pct, Some(50.0));
        assert_eq!(history[1].actual_change_pct, Some(-50.0));
    }

    #[test]
    fn test_gap_breaks_month_over_month() {
        let submissions = vec![
            record("2", "Seoul", "2025-02", 400.0, 0.0, 1),
            record("4", "Seoul", "2025-04", 500.0, 0.0, 1),
        ];
        let history = yearly_history(&submissions, "Seoul", 2025);
        assert!(!history[2].has_data);
        assert_eq!(history[3].estimated, 500.0);
        assert_eq!(history[3].estimated_change_pct, None);
        assert_eq!(history[3].actual_change_pct, None);
    }

    #[test]
    fn test_sides_compared_independently() {
        let submissions = vec![
            record("1", "Seoul", "2025-05", 100.0, 0.0, 1),
            record("2", "Seoul", "2025-06", 110.0, 300.0, 1),
        ];
        let history = yearly_history(&submissions, "Seoul", 2025);
        let june = &history[5];
        assert!((june.estimated_change_pct.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(june.actual_change_pct, None);
    }

    #[test]
    fn test_month_over_month_helper() {
        assert_eq!(month_over_month(0.0, 500.0), None);
        assert_eq!(month_over_month(500.0, 0.0), None);
        assert_eq!(month_over_month(200.0, 300.0), Some(50.0));
    }
}
