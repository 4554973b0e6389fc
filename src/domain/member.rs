use std::collections::BTreeSet;
use std::fmt;

use super::{Isbn, MemberId, RecordBorrowError, RecordReturnError};

/// 会員1人あたりの標準の貸出上限
pub const DEFAULT_MAX_LOANS: u32 = 5;

/// Member - 会員と、現在借りているISBNの集合
///
/// 不変条件：borrowed_isbns の件数 <= max_loans。
/// 各ISBNが実際に貸出中かどうかの整合性はCatalogが保証する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    pub borrowed_isbns: BTreeSet<Isbn>,
    pub max_loans: u32,
}

impl Member {
    pub fn new(member_id: MemberId, name: impl Into<String>) -> Self {
        Self::with_max_loans(member_id, name, DEFAULT_MAX_LOANS)
    }

    pub fn with_max_loans(member_id: MemberId, name: impl Into<String>, max_loans: u32) -> Self {
        Self {
            member_id,
            name: name.into(),
            borrowed_isbns: BTreeSet::new(),
            max_loans,
        }
    }

    /// 貸出上限に達していないか
    pub fn can_borrow(&self) -> bool {
        self.loan_count() < self.max_loans as usize
    }

    pub fn loan_count(&self) -> usize {
        self.borrowed_isbns.len()
    }

    pub fn is_holding(&self, isbn: &Isbn) -> bool {
        self.borrowed_isbns.contains(isbn)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} (Books: {})",
            self.member_id,
            self.name,
            self.loan_count()
        )
    }
}

/// 純粋関数：会員の貸出記録に追加する
///
/// ビジネスルール：
/// - 貸出上限に達していれば不可
/// - 同じISBNの二重記録は不可
pub fn record_borrow(member: &Member, isbn: Isbn) -> Result<Member, RecordBorrowError> {
    if !member.can_borrow() {
        return Err(RecordBorrowError::LimitReached);
    }
    if member.is_holding(&isbn) {
        return Err(RecordBorrowError::AlreadyHolding);
    }

    let mut borrowed_isbns = member.borrowed_isbns.clone();
    borrowed_isbns.insert(isbn);

    Ok(Member {
        borrowed_isbns,
        ..member.clone()
    })
}

/// 純粋関数：会員の貸出記録から削除する
///
/// 記録にないISBNはNotFound（呼び出し側で無視してよい）。
pub fn record_return(member: &Member, isbn: &Isbn) -> Result<Member, RecordReturnError> {
    if !member.is_holding(isbn) {
        return Err(RecordReturnError::NotFound);
    }

    let mut borrowed_isbns = member.borrowed_isbns.clone();
    borrowed_isbns.remove(isbn);

    Ok(Member {
        borrowed_isbns,
        ..member.clone()
    })
}
