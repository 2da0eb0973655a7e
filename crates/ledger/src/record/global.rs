use std::sync::Arc;
use std::sync::OnceLock;

use super::{RecordError, SqliteStore};
use crate::config::AppConfig;

/// 전역 저장소
/// 애플리케이션 전체에서 하나의 SQLite 연결 풀을 공유
static GLOBAL_STORE: OnceLock<Arc<SqliteStore>> = OnceLock::new();

/// 전역 저장소 초기화
pub async fn init_global_store(config: &AppConfig) -> Result<Arc<SqliteStore>, RecordError> {
    if let Some(store) = GLOBAL_STORE.get() {
        return Ok(store.clone());
    }

    let store = Arc::new(SqliteStore::from_config(config).await?);
    GLOBAL_STORE
        .set(store.clone())
        .map_err(|_| RecordError::Other("Store already initialized".to_string()))?;

    Ok(store)
}

/// 전역 저장소 가져오기
pub fn get_store() -> Option<Arc<SqliteStore>> {
    GLOBAL_STORE.get().cloned()
}
