use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use interface::{BranchConfig, TargetMonth, Timestamp};
use serde::{Deserialize, Serialize};

use super::index::BranchMonthIndex;
use super::rates::RateBook;
use super::totals::{KrwTotal, Variance, monthly_krw_totals, resolve_currency, variance};

/// 최근 수정 표시 기준 (일)
pub const RECENT_WINDOW_DAYS: i64 = 3;

/// 제출 시각이 `now` 기준 3일 이내인지. 제출 시각이 없으면 false.
pub fn is_recently_updated(submitted_at: Option<Timestamp>, now: DateTime<Utc>) -> bool {
    submitted_at
        .and_then(Timestamp::to_datetime)
        .is_some_and(|at| at >= now - Duration::days(RECENT_WINDOW_DAYS))
}

/// 대시보드 한 칸 (지점 × 월)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub month: TargetMonth,
    pub currency: String,
    pub has_data: bool,
    pub estimated: Option<f64>,
    pub actual: Option<f64>,
    pub variance: Option<Variance>,
    pub recently_updated: bool,
    pub submitted_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRow {
    pub branch: String,
    pub manager: Option<String>,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub months: Vec<TargetMonth>,
    pub rows: Vec<BranchRow>,
    pub krw_totals: BTreeMap<TargetMonth, KrwTotal>,
}

/// 지점별 월 그리드와 원화 합계 행을 만든다
pub fn build_dashboard(
    index: &BranchMonthIndex<'_>,
    branches: &[BranchConfig],
    months: &[TargetMonth],
    rates: &RateBook,
    now: DateTime<Utc>,
) -> Dashboard {
    let rows = branches
        .iter()
        .map(|branch| BranchRow {
            branch: branch.name.clone(),
            manager: branch.manager.clone(),
            cells: months
                .iter()
                .map(|&month| match index.get(&branch.name, month) {
                    Some(record) => GridCell {
                        month,
                        currency: resolve_currency(record, branch).to_string(),
                        has_data: true,
                        estimated: Some(record.total_estimated),
                        actual: Some(record.total_actual),
                        variance: variance(record),
                        recently_updated: is_recently_updated(record.submitted_at, now),
                        submitted_by: record.submitted_by.clone(),
                    },
                    None => GridCell {
                        month,
                        currency: branch.currency.clone(),
                        has_data: false,
                        estimated: None,
                        actual: None,
                        variance: None,
                        recently_updated: false,
                        submitted_by: None,
                    },
                })
                .collect(),
        })
        .collect();

    Dashboard {
        months: months.to_vec(),
        rows,
        krw_totals: monthly_krw_totals(index, branches, months, rates),
    }
}
