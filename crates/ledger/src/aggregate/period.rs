use chrono::{Datelike, NaiveDate};
use interface::{BranchConfig, TargetMonth};

/// 대시보드에 표시할 월 목록
///
/// - 월 필터가 있으면 그 달만
/// - 올해는 1월부터 이번 달까지 (미래 월 제외)
/// - 지난 해는 12개월 전부, 미래 연도는 없음
pub fn active_months(year: i32, month_filter: Option<u32>, today: NaiveDate) -> Vec<TargetMonth> {
    if let Some(month) = month_filter {
        return TargetMonth::new(year, month).into_iter().collect();
    }

    let last = match year.cmp(&today.year()) {
        std::cmp::Ordering::Less => 12,
        std::cmp::Ordering::Equal => today.month(),
        std::cmp::Ordering::Greater => 0,
    };
    TargetMonth::months_of(year)
        .take(last as usize)
        .collect()
}

/// 지점명이 주어지면 정확히 같은 이름의 지점만 남긴다
pub fn filter_branches(branches: &[BranchConfig], name: Option<&str>) -> Vec<BranchConfig> {
    branches
        .iter()
        .filter(|b| name.is_none_or(|n| b.name == n))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
    }

    #[test]
    fn test_month_filter_is_singleton() {
        let months = active_months(2023, Some(7), today());
        assert_eq!(months, vec![TargetMonth::new(2023, 7).unwrap()]);
        assert!(active_months(2023, Some(13), today()).is_empty());
    }

    #[test]
    fn test_current_year_stops_at_current_month() {
        let months = active_months(2025, None, today());
        assert_eq!(months.len(), 4);
        assert_eq!(months.last().unwrap().to_string(), "2025-04");
    }

    #[test]
    fn test_past_and_future_years() {
        assert_eq!(active_months(2024, None, today()).len(), 12);
        assert!(active_months(2026, None, today()).is_empty());
    }

    #[test]
    fn test_filter_branches() {
        let branches = vec![
            BranchConfig {
                name: "Seoul".to_string(),
                currency: "KRW".to_string(),
                ..Default::default()
            },
            BranchConfig {
                name: "Tokyo".to_string(),
                currency: "JPY".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(filter_branches(&branches, None).len(), 2);
        let tokyo = filter_branches(&branches, Some("Tokyo"));
        assert_eq!(tokyo.len(), 1);
        assert_eq!(tokyo[0].currency, "JPY");
        assert!(filter_branches(&branches, Some("tokyo")).is_empty());
    }
}
