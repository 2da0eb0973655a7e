/// 비용 제출 기록 엔티티 모듈
pub mod cost_submission {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "cost_submissions")]
    pub struct Model {
        /// 문서 ID
        #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
        pub id: String,

        /// 지점명 (정확히 일치하는 문자열로 비교)
        #[sea_orm(column_type = "Text")]
        pub branch_name: String,

        /// 대상 월 (YYYY-MM)
        #[sea_orm(column_type = "Text")]
        pub target_month: String,

        /// 제출 통화
        #[sea_orm(column_type = "Text")]
        pub currency: String,

        /// 비용 항목 목록 (JSON)
        #[sea_orm(column_type = "Text")]
        pub items: String,

        #[sea_orm(column_type = "Double")]
        pub total_estimated: f64,

        #[sea_orm(column_type = "Double")]
        pub total_actual: f64,

        /// 제출 시각 (초, NULL 가능)
        #[sea_orm(column_type = "BigInteger", nullable)]
        pub submitted_at_seconds: Option<i64>,

        /// 제출 시각 (나노초, NULL 가능)
        #[sea_orm(column_type = "BigInteger", nullable)]
        pub submitted_at_nanos: Option<i64>,

        /// 작성자 (NULL 가능)
        #[sea_orm(column_type = "Text", nullable)]
        pub submitted_by: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// 환율표 엔티티 모듈
pub mod exchange_rate_table {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "exchange_rate_tables")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = true)]
        pub id: i64,

        #[sea_orm(column_type = "Integer")]
        pub year: i32,

        /// 월 (NULL이면 연 단위 업로드)
        #[sea_orm(column_type = "Integer", nullable)]
        pub month: Option<i32>,

        /// 환율 목록 (JSON)
        #[sea_orm(column_type = "Text")]
        pub rates: String,

        #[sea_orm(column_type = "Text", nullable)]
        pub file_name: Option<String>,

        /// 업로드 UTC 시간 (ISO 8601 형식)
        #[sea_orm(column_type = "Text", nullable)]
        pub uploaded_at: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// 지점 설정 엔티티 모듈
pub mod branch {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "branches")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
        pub name: String,

        /// 기본 통화
        #[sea_orm(column_type = "Text")]
        pub currency: String,

        #[sea_orm(column_type = "Text", nullable)]
        pub manager: Option<String>,

        #[sea_orm(column_type = "Text", nullable)]
        pub payment_method: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
