use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre;
use interface::{BranchConfig, CostSubmission, ExchangeRateTable};
use serde::de::DeserializeOwned;
use structopt::StructOpt;
use tracing::info;

use ledger::config::AppConfig;
use ledger::report::{render_dashboard, render_history};
use ledger::service::{DashboardQuery, ReportService, current_year};

#[derive(Debug, StructOpt)]
#[structopt(name = "ledger", about = "지점 비용 보고 집계")]
enum Command {
    /// API 서버 실행
    Serve,
    /// 지점 × 월 비용 현황과 원화 합계 출력
    Dashboard {
        #[structopt(long)]
        year: Option<i32>,
        #[structopt(long)]
        month: Option<u32>,
        #[structopt(long)]
        branch: Option<String>,
    },
    /// 지점 연간 이력 출력
    History {
        #[structopt(long)]
        branch: String,
        #[structopt(long)]
        year: Option<i32>,
    },
    /// 비용 제출 기록 JSON 가져오기
    ImportSubmissions {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// 환율표 JSON 가져오기
    ImportRates {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// 지점 설정 JSON 가져오기
    ImportBranches {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    let config = AppConfig::from_env();

    // init logging
    let _guards = ledger::logger::init_tracing(&config);

    ledger::record::init_global_store(&config)
        .await
        .map_err(|e| eyre::eyre!("저장소 초기화 실패: {}", e))?;

    let cmd = Command::from_args();

    match cmd {
        Command::Serve => serve(&config).await,
        Command::Dashboard {
            year,
            month,
            branch,
        } => print_dashboard(year, month, branch).await,
        Command::History { branch, year } => print_history(&branch, year).await,
        Command::ImportSubmissions { path } => import_submissions(&path).await,
        Command::ImportRates { path } => import_rates(&path).await,
        Command::ImportBranches { path } => import_branches(&path).await,
    }
}

fn service() -> eyre::Result<ReportService> {
    let store = ledger::record::get_store()
        .ok_or_else(|| eyre::eyre!("저장소가 초기화되지 않았습니다"))?;
    Ok(ReportService::from_store(store))
}

/// JSON 파일은 배열 또는 단일 객체
fn read_json_list<T: DeserializeOwned>(path: &Path) -> eyre::Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("{} 읽기 실패: {}", path.display(), e))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let list = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(list)
}

async fn serve(config: &AppConfig) -> eyre::Result<()> {
    let service = Arc::new(service()?);
    info!("API 서버를 포트 {}에서 시작합니다", config.api_port);
    ledger::server::start_server(config.api_port, service).await
}

async fn print_dashboard(
    year: Option<i32>,
    month: Option<u32>,
    branch: Option<String>,
) -> eyre::Result<()> {
    let now = Utc::now();
    let query = DashboardQuery {
        year: year.unwrap_or_else(|| current_year(now)),
        month,
        branch,
    };
    let dashboard = service()?.dashboard(&query, now).await?;
    print!("{}", render_dashboard(&dashboard));
    Ok(())
}

async fn print_history(branch: &str, year: Option<i32>) -> eyre::Result<()> {
    let year = year.unwrap_or_else(|| current_year(Utc::now()));
    let history = service()?.history(branch, year).await?;
    print!("{}", render_history(branch, &history));
    Ok(())
}

async fn import_submissions(path: &Path) -> eyre::Result<()> {
    let submissions: Vec<CostSubmission> = read_json_list(path)?;
    let total = service()?.import_submissions(submissions).await?;
    info!("제출 기록 {}건을 가져왔습니다", total);
    Ok(())
}

async fn import_rates(path: &Path) -> eyre::Result<()> {
    let service = service()?;
    let tables: Vec<ExchangeRateTable> = read_json_list(path)?;
    let total = tables.len();
    for mut table in tables {
        if table.file_name.is_none() {
            table.file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
        service.upload_rates(table, Utc::now()).await?;
    }
    info!("환율표 {}건을 가져왔습니다", total);
    Ok(())
}

async fn import_branches(path: &Path) -> eyre::Result<()> {
    let service = service()?;
    let branches: Vec<BranchConfig> = read_json_list(path)?;
    for branch in &branches {
        service.save_branch(branch).await?;
    }
    info!("지점 {}개를 저장했습니다", branches.len());
    Ok(())
}
