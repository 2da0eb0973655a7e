use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 서버가 부여하는 시각 (초 + 나노초)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp {
    pub seconds: i64,
    #[serde(rename = "nanoseconds", default)]
    pub nanos: u32,
}

impl Timestamp {
    /// 가장 오래된 시각. submittedAt이 없는 기록은 이 값으로 취급한다.
    pub const ZERO: Timestamp = Timestamp {
        seconds: 0,
        nanos: 0,
    };

    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanos: at.timestamp_subsec_nanos(),
        }
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }
}

/// 보고 대상 월 (YYYY-MM)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetMonth {
    pub year: i32,
    pub month: u32,
}

impl TargetMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ParseError> {
        if !(1..=12).contains(&month) {
            return Err(ParseError::InvalidMonth(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// 같은 해의 1월부터 12월까지
    pub fn months_of(year: i32) -> impl Iterator<Item = TargetMonth> {
        (1..=12).map(move |month| TargetMonth { year, month })
    }
}

impl Display for TargetMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for TargetMonth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidMonth(s.to_string());

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        TargetMonth::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TargetMonth {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetMonth> for String {
    fn from(value: TargetMonth) -> Self {
        value.to_string()
    }
}

/// 비용 항목 (한 줄)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostItem {
    pub item: String,
    pub unit_price: Option<f64>,
    pub quantity: Option<f64>,
    pub qty_unit: Option<String>,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    /// 항목별 통화 (없으면 제출 통화)
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl CostItem {
    /// 단가 × 수량이 모두 양수면 그 곱, 아니면 직접 입력한 예상 비용
    pub fn derived_estimate(&self) -> f64 {
        match (self.unit_price, self.quantity) {
            (Some(price), Some(qty)) if price > 0.0 && qty > 0.0 => price * qty,
            _ => self.estimated_cost,
        }
    }
}

/// 지점 매니저의 월별 비용 제출 기록
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSubmission {
    /// 저장소 문서 ID
    #[serde(default)]
    pub id: String,
    pub branch_name: String,
    /// YYYY-MM (검증은 집계 시점에)
    pub target_month: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub items: Vec<CostItem>,
    #[serde(default)]
    pub total_estimated: f64,
    #[serde(default)]
    pub total_actual: f64,
    #[serde(default)]
    pub submitted_at: Option<Timestamp>,
    #[serde(default)]
    pub submitted_by: Option<String>,
}

impl CostSubmission {
    pub fn parsed_month(&self) -> Option<TargetMonth> {
        self.target_month.parse().ok()
    }

    pub fn submitted_at_or_zero(&self) -> Timestamp {
        self.submitted_at.unwrap_or(Timestamp::ZERO)
    }

    /// 항목별 예상 비용을 다시 계산하고 합계를 갱신
    pub fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.estimated_cost = item.derived_estimate();
        }
        self.total_estimated = self.items.iter().map(|i| i.estimated_cost).sum();
        self.total_actual = self.items.iter().map(|i| i.actual_cost).sum();
    }
}

/// 환율 한 건: `ratio` 단위의 `currency`가 `rate` 원
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub currency: String,
    pub rate: f64,
    #[serde(default)]
    pub ratio: Option<f64>,
}

impl ExchangeRate {
    /// 1 단위당 원화 환율. ratio가 없거나 0이면 1로 본다.
    pub fn per_unit_krw(&self) -> f64 {
        let ratio = match self.ratio {
            Some(r) if r != 0.0 => r,
            _ => 1.0,
        };
        self.rate / ratio
    }
}

/// 업로드된 환율표. `month`가 없으면 연 단위 업로드.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateTable {
    pub year: i32,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub rates: Vec<ExchangeRate>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl ExchangeRateTable {
    pub fn find(&self, currency: &str) -> Option<&ExchangeRate> {
        self.rates.iter().find(|r| r.currency == currency)
    }
}

/// 지점 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchConfig {
    pub name: String,
    /// 기본 통화
    pub currency: String,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid target month: {0}")]
    InvalidMonth(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_month_parse() {
        let month: TargetMonth = "2025-03".parse().unwrap();
        assert_eq!(month, TargetMonth { year: 2025, month: 3 });
        assert_eq!(month.to_string(), "2025-03");
    }

    #[test]
    fn test_target_month_rejects_bad_shapes() {
        for raw in ["", "2025", "2025-13", "2025-00", "2025-1", "25-01", "2025/01", "abcd-ef"] {
            assert!(raw.parse::<TargetMonth>().is_err(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn test_target_month_serde_as_string() {
        let month = TargetMonth::new(2024, 11).unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2024-11\"");
        let back: TargetMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
        assert!(serde_json::from_str::<TargetMonth>("\"2024-99\"").is_err());
    }

    #[test]
    fn test_timestamp_ordering() {
        assert!(Timestamp::new(200, 0) > Timestamp::new(100, 999));
        assert!(Timestamp::new(100, 5) > Timestamp::new(100, 4));
        assert!(Timestamp::ZERO < Timestamp::new(1, 0));
    }

    #[test]
    fn test_timestamp_datetime_conversion() {
        let at = DateTime::from_timestamp(1_700_000_000, 42).unwrap();
        let ts = Timestamp::from_datetime(at);
        assert_eq!(ts, Timestamp::new(1_700_000_000, 42));
        assert_eq!(ts.to_datetime(), Some(at));
    }

    #[test]
    fn test_derived_estimate() {
        let mut item = CostItem {
            unit_price: Some(1500.0),
            quantity: Some(3.0),
            estimated_cost: 10.0,
            ..Default::default()
        };
        assert_eq!(item.derived_estimate(), 4500.0);

        item.quantity = Some(0.0);
        assert_eq!(item.derived_estimate(), 10.0);

        item.unit_price = None;
        item.quantity = Some(2.0);
        assert_eq!(item.derived_estimate(), 10.0);
    }

    #[test]
    fn test_recompute_totals() {
        let mut submission = CostSubmission {
            items: vec![
                CostItem {
                    unit_price: Some(100.0),
                    quantity: Some(2.0),
                    actual_cost: 210.0,
                    ..Default::default()
                },
                CostItem {
                    estimated_cost: 50.0,
                    actual_cost: 40.0,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        submission.recompute_totals();
        assert_eq!(submission.items[0].estimated_cost, 200.0);
        assert_eq!(submission.total_estimated, 250.0);
        assert_eq!(submission.total_actual, 250.0);
    }

    #[test]
    fn test_per_unit_krw() {
        let jpy = ExchangeRate {
            currency: "JPY".to_string(),
            rate: 900.0,
            ratio: Some(100.0),
        };
        assert_eq!(jpy.per_unit_krw(), 9.0);

        let zero_ratio = ExchangeRate {
            ratio: Some(0.0),
            ..jpy.clone()
        };
        assert_eq!(zero_ratio.per_unit_krw(), 900.0);
    }

    #[test]
    fn test_submission_deserializes_store_document() {
        let json = r#"{
            "id": "abc",
            "branchName": "Tokyo",
            "targetMonth": "2025-02",
            "currency": "JPY",
            "items": [
                {"item": "rent", "estimatedCost": 100000, "actualCost": 0, "currency": "JPY"}
            ],
            "totalEstimated": 100000,
            "totalActual": 0,
            "submittedAt": {"seconds": 10, "nanoseconds": 5},
            "submittedBy": "manager@example.com"
        }"#;
        let submission: CostSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.branch_name, "Tokyo");
        assert_eq!(submission.items.len(), 1);
        assert_eq!(submission.submitted_at, Some(Timestamp::new(10, 5)));
        assert_eq!(
            submission.parsed_month(),
            Some(TargetMonth { year: 2025, month: 2 })
        );
    }
}
