use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use interface::{BranchConfig, CostSubmission, ExchangeRateTable, TargetMonth, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{
    Dashboard, HistoryMonth, active_months, build_branch_month_index, build_dashboard,
    filter_branches, yearly_history,
};
use crate::record::{
    BranchRepository, RateRepository, RecordError, SqliteStore, SubmissionQuery,
    SubmissionRepository,
};

/// 대시보드 조회 조건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub year: i32,
    pub month: Option<u32>,
    pub branch: Option<String>,
}

/// 저장소에서 읽어 와서 집계 함수에 넘기는 조회 서비스
#[derive(Clone)]
pub struct ReportService {
    submissions: Arc<dyn SubmissionRepository>,
    rates: Arc<dyn RateRepository>,
    branches: Arc<dyn BranchRepository>,
}

impl ReportService {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        rates: Arc<dyn RateRepository>,
        branches: Arc<dyn BranchRepository>,
    ) -> Self {
        Self {
            submissions,
            rates,
            branches,
        }
    }

    pub fn from_store(store: Arc<SqliteStore>) -> Self {
        Self::new(store.clone(), store.clone(), store)
    }

    /// 지점 × 월 그리드와 원화 합계
    pub async fn dashboard(
        &self,
        query: &DashboardQuery,
        now: DateTime<Utc>,
    ) -> Result<Dashboard, RecordError> {
        let months = active_months(query.year, query.month, now.date_naive());
        let submission_query = SubmissionQuery {
            branch: query.branch.clone(),
            year: Some(query.year),
            month: query.month,
        };

        // 지점, 제출 기록, 환율은 서로 독립적이라 동시에 조회
        let (branches, submissions, rate_book) = tokio::try_join!(
            self.branches.find_all(),
            self.submissions.find(&submission_query),
            self.rates.rate_book(query.year),
        )?;

        let branches = filter_branches(&branches, query.branch.as_deref());
        let index = build_branch_month_index(&submissions);

        Ok(build_dashboard(&index, &branches, &months, &rate_book, now))
    }

    /// 지점 연간 이력
    pub async fn history(&self, branch: &str, year: i32) -> Result<Vec<HistoryMonth>, RecordError> {
        let submissions = self
            .submissions
            .find(&SubmissionQuery::branch_year(branch, year))
            .await?;
        Ok(yearly_history(&submissions, branch, year))
    }

    pub async fn branches(&self) -> Result<Vec<BranchConfig>, RecordError> {
        self.branches.find_all().await
    }

    /// 매니저의 비용 제출 저장
    ///
    /// 합계를 다시 계산하고 ID와 제출 시각은 항상 서버가 새로 부여한다.
    /// 같은 지점/월의 이전 제출은 이력으로 남는다.
    pub async fn submit(
        &self,
        mut submission: CostSubmission,
        now: DateTime<Utc>,
    ) -> Result<CostSubmission, RecordError> {
        let month: TargetMonth = submission
            .target_month
            .parse()
            .map_err(|e| RecordError::InvalidRecord(format!("{}", e)))?;
        if submission.branch_name.trim().is_empty() {
            return Err(RecordError::InvalidRecord(
                "branch name must not be empty".to_string(),
            ));
        }

        submission.target_month = month.to_string();
        submission.recompute_totals();
        submission.id = uuid::Uuid::new_v4().to_string();
        submission.submitted_at = Some(Timestamp::from_datetime(now));

        self.submissions.save(&submission).await?;
        info!(
            "Cost submission saved: {} {} (est={}, act={})",
            submission.branch_name, month, submission.total_estimated, submission.total_actual
        );

        Ok(submission)
    }

    /// 내보낸 제출 문서를 그대로 가져온다
    ///
    /// 합계와 submittedAt은 건드리지 않는다. ID가 같은 문서는 덮어쓰고,
    /// ID가 없는 문서만 새 ID를 받는다.
    pub async fn import_submissions(
        &self,
        mut submissions: Vec<CostSubmission>,
    ) -> Result<usize, RecordError> {
        for submission in &mut submissions {
            if submission.id.is_empty() {
                submission.id = uuid::Uuid::new_v4().to_string();
            }
        }

        self.submissions.save_batch(&submissions).await?;
        info!("Cost submissions imported: {}", submissions.len());

        Ok(submissions.len())
    }

    pub async fn rates(
        &self,
        year: i32,
        month: Option<u32>,
    ) -> Result<Option<ExchangeRateTable>, RecordError> {
        self.rates.find(year, month).await
    }

    /// 환율표 업로드. 업로드 시각이 없으면 `now`.
    pub async fn upload_rates(
        &self,
        mut table: ExchangeRateTable,
        now: DateTime<Utc>,
    ) -> Result<ExchangeRateTable, RecordError> {
        if table.uploaded_at.is_none() {
            table.uploaded_at = Some(now);
        }
        self.rates.save(&table).await?;
        info!(
            "Exchange rates uploaded: {}{} ({} currencies)",
            table.year,
            table.month.map(|m| format!("-{:02}", m)).unwrap_or_default(),
            table.rates.len()
        );
        Ok(table)
    }

    pub async fn save_branch(&self, branch: &BranchConfig) -> Result<(), RecordError> {
        self.branches.save(branch).await
    }
}

/// 연도 파라미터가 없을 때 쓰는 올해
pub fn current_year(now: DateTime<Utc>) -> i32 {
    now.year()
}
