use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interface::{BranchConfig, CostSubmission, ExchangeRateTable, Timestamp};
use serde::{Deserialize, Serialize};

use crate::aggregate::RateBook;

/// 제출 기록 조회 조건 (모두 선택)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionQuery {
    /// 지점명 (정확히 일치)
    pub branch: Option<String>,
    pub year: Option<i32>,
    /// 1~12
    pub month: Option<u32>,
}

impl SubmissionQuery {
    pub fn branch_year(branch: &str, year: i32) -> Self {
        Self {
            branch: Some(branch.to_string()),
            year: Some(year),
            month: None,
        }
    }
}

/// 비용 제출 기록 저장소 인터페이스
/// 조회 결과는 순서가 없고, 같은 지점+월의 이전 제출도 포함될 수 있다
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// 제출 기록 저장 (같은 ID면 덮어씀)
    async fn save(&self, submission: &CostSubmission) -> Result<(), RecordError>;

    /// 제출 기록 여러 개 일괄 저장
    async fn save_batch(&self, submissions: &[CostSubmission]) -> Result<(), RecordError>;

    /// 조건으로 제출 기록 조회
    async fn find(&self, query: &SubmissionQuery) -> Result<Vec<CostSubmission>, RecordError>;
}

/// 환율표 저장소 인터페이스
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// 환율표 저장 (같은 기간의 기존 환율표는 교체)
    async fn save(&self, table: &ExchangeRateTable) -> Result<(), RecordError>;

    /// 정확히 그 기간으로 업로드된 환율표 조회. `month`가 None이면 연 단위 환율표.
    async fn find(
        &self,
        year: i32,
        month: Option<u32>,
    ) -> Result<Option<ExchangeRateTable>, RecordError>;

    /// 해당 연도의 모든 환율표 (연 단위 + 월 단위)
    async fn find_by_year(&self, year: i32) -> Result<Vec<ExchangeRateTable>, RecordError>;

    /// 해당 연도 집계용 환율 모음
    async fn rate_book(&self, year: i32) -> Result<RateBook, RecordError> {
        Ok(RateBook::from_tables(self.find_by_year(year).await?))
    }
}

/// 지점 설정 저장소 인터페이스
#[async_trait]
pub trait BranchRepository: Send + Sync {
    /// 지점 저장 (이름이 같으면 갱신)
    async fn save(&self, branch: &BranchConfig) -> Result<(), RecordError>;

    /// 모든 지점 조회 (이름순)
    async fn find_all(&self) -> Result<Vec<BranchConfig>, RecordError>;
}

/// SeaORM cost_submission::Model을 CostSubmission으로 변환
impl TryFrom<super::entities::cost_submission::Model> for CostSubmission {
    type Error = RecordError;

    fn try_from(model: super::entities::cost_submission::Model) -> Result<Self, Self::Error> {
        let items = serde_json::from_str(&model.items)?;

        let submitted_at = model.submitted_at_seconds.map(|seconds| {
            let nanos = model
                .submitted_at_nanos
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Timestamp::new(seconds, nanos)
        });

        Ok(CostSubmission {
            id: model.id,
            branch_name: model.branch_name,
            target_month: model.target_month,
            currency: model.currency,
            items,
            total_estimated: model.total_estimated,
            total_actual: model.total_actual,
            submitted_at,
            submitted_by: model.submitted_by,
        })
    }
}

/// SeaORM exchange_rate_table::Model을 ExchangeRateTable로 변환
impl TryFrom<super::entities::exchange_rate_table::Model> for ExchangeRateTable {
    type Error = RecordError;

    fn try_from(model: super::entities::exchange_rate_table::Model) -> Result<Self, Self::Error> {
        let rates = serde_json::from_str(&model.rates)?;

        let month = model
            .month
            .map(|m| {
                u32::try_from(m)
                    .map_err(|_| RecordError::InvalidRecord(format!("Invalid month: {}", m)))
            })
            .transpose()?;

        let uploaded_at = model
            .uploaded_at
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|at| at.with_timezone(&Utc))
                    .map_err(|e| RecordError::Other(format!("Failed to parse uploaded_at: {}", e)))
            })
            .transpose()?;

        Ok(ExchangeRateTable {
            year: model.year,
            month,
            rates,
            file_name: model.file_name,
            uploaded_at,
        })
    }
}

impl From<super::entities::branch::Model> for BranchConfig {
    fn from(model: super::entities::branch::Model) -> Self {
        BranchConfig {
            name: model.name,
            currency: model.currency,
            manager: model.manager,
            payment_method: model.payment_method,
        }
    }
}

/// 기록 저장소 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Other error: {0}")]
    Other(String),
}
