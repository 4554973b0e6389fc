use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 識別子のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// 空文字列または空白のみ
    Blank,
}

/// ISBN - 書籍の一意キー
///
/// 比較は完全一致（大文字小文字を区別する）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    /// 検証なしで作成する（内部・テスト用）
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Isbn {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(IdentifierError::Blank);
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 会員ID - 会員の一意キー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// 検証なしで作成する（内部・テスト用）
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(IdentifierError::Blank);
        }
        Ok(Self(value))
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 貸出期間エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanPeriodError {
    /// 0日の貸出期間は作れない
    ZeroDays,
}

/// 貸出期間（日数）
///
/// 不変条件：1日以上。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPeriod(u32);

impl LoanPeriod {
    /// 標準の貸出期間
    pub const DEFAULT_DAYS: u32 = 14;

    pub fn days(&self) -> u32 {
        self.0
    }

    /// 貸出日から返却期限を計算する
    pub fn due_date_from(&self, borrowed_on: NaiveDate) -> NaiveDate {
        borrowed_on + Duration::days(i64::from(self.0))
    }
}

impl Default for LoanPeriod {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}

impl TryFrom<u32> for LoanPeriod {
    type Error = LoanPeriodError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(LoanPeriodError::ZeroDays);
        }
        Ok(Self(value))
    }
}

/// 1日あたりの延滞料金
///
/// 通貨単位は表示層の関心事なので、ここでは整数の単位数だけを扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineRate(u64);

impl FineRate {
    /// 標準の延滞料金（1日2単位）
    pub const DEFAULT_PER_DAY: u64 = 2;

    pub fn per_day(per_day: u64) -> Self {
        Self(per_day)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// 延滞日数から延滞料金を計算する
    pub fn fine_for(&self, days_late: u64) -> Fine {
        Fine {
            days_late,
            amount: days_late.saturating_mul(self.0),
        }
    }
}

impl Default for FineRate {
    fn default() -> Self {
        Self(Self::DEFAULT_PER_DAY)
    }
}

/// 延滞料金（返却時に算出、保存も徴収もしない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    pub days_late: u64,
    pub amount: u64,
}
