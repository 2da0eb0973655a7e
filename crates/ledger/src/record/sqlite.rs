use async_trait::async_trait;
use interface::{BranchConfig, CostSubmission, ExchangeRateTable};
use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Schema, Set,
};
use std::path::PathBuf;
use tracing::info;

use super::entities::{branch, cost_submission, exchange_rate_table};
use super::{BranchRepository, RateRepository, RecordError, SubmissionQuery, SubmissionRepository};
use crate::config::AppConfig;

/// SQLite 기반 저장소 (제출 기록, 환율표, 지점 설정)
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// 설정의 DB_PATH로 SQLite 파일을 열고 테이블을 준비
    pub async fn from_config(config: &AppConfig) -> Result<Self, RecordError> {
        // 절대 경로 또는 상대 경로 처리
        let mut path = PathBuf::from(&config.db_path);
        if !path.is_absolute() {
            if let Ok(current_dir) = std::env::current_dir() {
                path = current_dir.join(&config.db_path);
            }
        }

        // 디렉토리가 없으면 생성
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecordError::Other(format!("Failed to create DB directory: {}", e)))?;
        }

        Self::connect(&format!("sqlite://{}?mode=rwc", path.to_string_lossy())).await
    }

    /// 주어진 URL로 연결 (테스트에서는 `sqlite::memory:`)
    pub async fn connect(db_url: &str) -> Result<Self, RecordError> {
        info!("Connecting to SQLite database: {}", db_url);

        let mut options = ConnectOptions::new(db_url.to_string());
        options.sqlx_logging(false);
        if db_url.contains(":memory:") {
            // 메모리 DB는 연결마다 따로 생기므로 연결 하나만 사용
            options.max_connections(1).min_connections(1);
        }

        let db = Database::connect(options).await?;
        let store = Self { db };
        store.create_tables().await?;

        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), RecordError> {
        // SeaORM SchemaBuilder를 사용하여 테이블 생성 (IF NOT EXISTS)
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let mut submissions = schema.create_table_from_entity(cost_submission::Entity);
        submissions.if_not_exists();
        self.db.execute(backend.build(&submissions)).await?;

        let mut rates = schema.create_table_from_entity(exchange_rate_table::Entity);
        rates.if_not_exists();
        self.db.execute(backend.build(&rates)).await?;

        let mut branches = schema.create_table_from_entity(branch::Entity);
        branches.if_not_exists();
        self.db.execute(backend.build(&branches)).await?;

        let indexes: [(&str, IndexCreateStatement); 3] = [
            (
                "idx_cost_submissions_branch_month",
                Index::create()
                    .name("idx_cost_submissions_branch_month")
                    .table(cost_submission::Entity)
                    .col(cost_submission::Column::BranchName)
                    .col(cost_submission::Column::TargetMonth)
                    .if_not_exists()
                    .to_owned(),
            ),
            (
                "idx_cost_submissions_target_month",
                Index::create()
                    .name("idx_cost_submissions_target_month")
                    .table(cost_submission::Entity)
                    .col(cost_submission::Column::TargetMonth)
                    .if_not_exists()
                    .to_owned(),
            ),
            (
                "idx_exchange_rate_tables_period",
                Index::create()
                    .name("idx_exchange_rate_tables_period")
                    .table(exchange_rate_table::Entity)
                    .col(exchange_rate_table::Column::Year)
                    .col(exchange_rate_table::Column::Month)
                    .if_not_exists()
                    .to_owned(),
            ),
        ];

        for (name, statement) in &indexes {
            if let Err(e) = self.db.execute(backend.build(statement)).await {
                tracing::debug!("Index {} creation skipped: {}", name, e);
            }
        }

        info!("Ledger tables initialized");
        Ok(())
    }
}

fn submission_model(
    submission: &CostSubmission,
) -> Result<cost_submission::ActiveModel, RecordError> {
    Ok(cost_submission::ActiveModel {
        id: Set(submission.id.clone()),
        branch_name: Set(submission.branch_name.clone()),
        target_month: Set(submission.target_month.clone()),
        currency: Set(submission.currency.clone()),
        items: Set(serde_json::to_string(&submission.items)?),
        total_estimated: Set(submission.total_estimated),
        total_actual: Set(submission.total_actual),
        submitted_at_seconds: Set(submission.submitted_at.map(|t| t.seconds)),
        submitted_at_nanos: Set(submission.submitted_at.map(|t| i64::from(t.nanos))),
        submitted_by: Set(submission.submitted_by.clone()),
    })
}

fn submission_upsert() -> OnConflict {
    OnConflict::column(cost_submission::Column::Id)
        .update_columns([
            cost_submission::Column::BranchName,
            cost_submission::Column::TargetMonth,
            cost_submission::Column::Currency,
            cost_submission::Column::Items,
            cost_submission::Column::TotalEstimated,
            cost_submission::Column::TotalActual,
            cost_submission::Column::SubmittedAtSeconds,
            cost_submission::Column::SubmittedAtNanos,
            cost_submission::Column::SubmittedBy,
        ])
        .to_owned()
}

#[async_trait]
impl SubmissionRepository for SqliteStore {
    async fn save(&self, submission: &CostSubmission) -> Result<(), RecordError> {
        if submission.id.is_empty() {
            return Err(RecordError::InvalidRecord(
                "submission id must not be empty".to_string(),
            ));
        }

        cost_submission::Entity::insert(submission_model(submission)?)
            .on_conflict(submission_upsert())
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn save_batch(&self, submissions: &[CostSubmission]) -> Result<(), RecordError> {
        // 한 문장 upsert에 같은 ID가 두 번 나오면 실패하므로 하나씩
        for submission in submissions {
            SubmissionRepository::save(self, submission).await?;
        }
        Ok(())
    }

    async fn find(&self, query: &SubmissionQuery) -> Result<Vec<CostSubmission>, RecordError> {
        let mut select = cost_submission::Entity::find();

        if let Some(branch) = &query.branch {
            select = select.filter(cost_submission::Column::BranchName.eq(branch.as_str()));
        }
        select = match (query.year, query.month) {
            (Some(year), Some(month)) => select.filter(
                cost_submission::Column::TargetMonth.eq(format!("{:04}-{:02}", year, month)),
            ),
            (Some(year), None) => select
                .filter(cost_submission::Column::TargetMonth.starts_with(format!("{:04}-", year))),
            (None, Some(month)) => select
                .filter(cost_submission::Column::TargetMonth.ends_with(format!("-{:02}", month))),
            (None, None) => select,
        };

        let models = select.all(&self.db).await?;
        models.into_iter().map(|m| m.try_into()).collect()
    }
}

#[async_trait]
impl RateRepository for SqliteStore {
    async fn save(&self, table: &ExchangeRateTable) -> Result<(), RecordError> {
        let month = table
            .month
            .map(|m| {
                i32::try_from(m)
                    .ok()
                    .filter(|m| (1..=12).contains(m))
                    .ok_or_else(|| RecordError::InvalidRecord(format!("Invalid month: {}", m)))
            })
            .transpose()?;

        // 같은 기간 기존 환율표 삭제
        let period = exchange_rate_table::Column::Year.eq(table.year);
        let period = match month {
            Some(m) => period.and(exchange_rate_table::Column::Month.eq(m)),
            None => period.and(exchange_rate_table::Column::Month.is_null()),
        };
        exchange_rate_table::Entity::delete_many()
            .filter(period)
            .exec(&self.db)
            .await?;

        let model = exchange_rate_table::ActiveModel {
            year: Set(table.year),
            month: Set(month),
            rates: Set(serde_json::to_string(&table.rates)?),
            file_name: Set(table.file_name.clone()),
            uploaded_at: Set(table.uploaded_at.map(|at| at.to_rfc3339())),
            ..Default::default()
        };
        exchange_rate_table::Entity::insert(model)
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn find(
        &self,
        year: i32,
        month: Option<u32>,
    ) -> Result<Option<ExchangeRateTable>, RecordError> {
        let mut select =
            exchange_rate_table::Entity::find().filter(exchange_rate_table::Column::Year.eq(year));
        select = match month {
            Some(m) => select.filter(exchange_rate_table::Column::Month.eq(m as i64)),
            None => select.filter(exchange_rate_table::Column::Month.is_null()),
        };

        let model = select
            .order_by_desc(exchange_rate_table::Column::Id)
            .one(&self.db)
            .await?;

        model.map(|m| m.try_into()).transpose()
    }

    async fn find_by_year(&self, year: i32) -> Result<Vec<ExchangeRateTable>, RecordError> {
        let models = exchange_rate_table::Entity::find()
            .filter(exchange_rate_table::Column::Year.eq(year))
            .order_by_asc(exchange_rate_table::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(|m| m.try_into()).collect()
    }
}

#[async_trait]
impl BranchRepository for SqliteStore {
    async fn save(&self, config: &BranchConfig) -> Result<(), RecordError> {
        if config.name.is_empty() {
            return Err(RecordError::InvalidRecord(
                "branch name must not be empty".to_string(),
            ));
        }

        let model = branch::ActiveModel {
            name: Set(config.name.clone()),
            currency: Set(config.currency.clone()),
            manager: Set(config.manager.clone()),
            payment_method: Set(config.payment_method.clone()),
        };

        branch::Entity::insert(model)
            .on_conflict(
                OnConflict::column(branch::Column::Name)
                    .update_columns([
                        branch::Column::Currency,
                        branch::Column::Manager,
                        branch::Column::PaymentMethod,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<BranchConfig>, RecordError> {
        let models = branch::Entity::find()
            .order_by_asc(branch::Column::Name)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(BranchConfig::from).collect())
    }
}
