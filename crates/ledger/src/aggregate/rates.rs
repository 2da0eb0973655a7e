use std::collections::BTreeMap;

use interface::{ExchangeRateTable, TargetMonth};

/// 기준 통화. 환율표를 조회하지 않고 항상 1로 본다.
pub const BASE_CURRENCY: &str = "KRW";

/// 통화 1 단위당 원화 환율
///
/// 환율표에 없는 통화(또는 환율표 자체가 없는 경우)는 `None`이다.
/// 0으로 취급하면 안 된다.
pub fn rate_for_currency(table: Option<&ExchangeRateTable>, currency: &str) -> Option<f64> {
    if currency == BASE_CURRENCY {
        return Some(1.0);
    }
    table?.find(currency).map(|entry| entry.per_unit_krw())
}

/// 연 단위/월 단위 환율표 모음
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    yearly: BTreeMap<i32, ExchangeRateTable>,
    monthly: BTreeMap<TargetMonth, ExchangeRateTable>,
}

impl RateBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = ExchangeRateTable>,
    {
        let mut book = Self::new();
        for table in tables {
            book.insert(table);
        }
        book
    }

    /// 같은 기간의 환율표가 이미 있으면 교체된다.
    /// 월 값이 1~12 밖인 환율표는 무시한다.
    pub fn insert(&mut self, table: ExchangeRateTable) {
        match table.month {
            None => {
                self.yearly.insert(table.year, table);
            }
            Some(month) => {
                if let Ok(key) = TargetMonth::new(table.year, month) {
                    self.monthly.insert(key, table);
                }
            }
        }
    }

    /// 월 단위 환율표가 우선이고, 없으면 해당 연도의 연 단위 환율표
    pub fn table_for(&self, month: TargetMonth) -> Option<&ExchangeRateTable> {
        self.monthly
            .get(&month)
            .or_else(|| self.yearly.get(&month.year))
    }

    pub fn rate_for(&self, month: TargetMonth, currency: &str) -> Option<f64> {
        rate_for_currency(self.table_for(month), currency)
    }

    pub fn is_empty(&self) -> bool {
        self.yearly.is_empty() && self.monthly.is_empty()
    }
}
