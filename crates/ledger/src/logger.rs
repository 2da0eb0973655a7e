use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;

/// 콘솔 + 일 단위 롤링 파일 로그 초기화
///
/// 반환된 가드가 살아 있는 동안만 파일 로그가 flush 된다
pub fn init_tracing(config: &AppConfig) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let file_appender = rolling::daily(&config.log_dir, "ledger.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    guards.push(file_guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.log_level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init();

    if let Err(e) = result {
        eprintln!("로그 초기화 실패: {}", e);
    }

    guards
}
