//! 지점 비용 집계
//!
//! 이미 조회된 제출 기록과 환율표만 받아서 계산하는 순수 함수 모음.
//! 데이터가 빠진 경우는 에러가 아니라 `None`/`false`/제외로 처리한다.

pub mod grid;
pub mod history;
pub mod index;
pub mod period;
pub mod rates;
pub mod totals;

pub use grid::{BranchRow, Dashboard, GridCell, build_dashboard, is_recently_updated};
pub use history::{HistoryMonth, month_over_month, yearly_history};
pub use index::{BranchMonthIndex, build_branch_month_index, supersedes};
pub use period::{active_months, filter_branches};
pub use rates::{BASE_CURRENCY, RateBook, rate_for_currency};
pub use totals::{KrwTotal, Variance, monthly_krw_totals, resolve_currency, variance};
