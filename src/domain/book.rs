use chrono::NaiveDate;
use std::fmt;

use super::{BookCheckedOut, CheckOutError, Fine, FineRate, Isbn, LoanPeriod, MemberId};

// ============================================================================
// 型安全な貸出状態
// ============================================================================

/// 貸出中の情報
///
/// 借りている会員と返却期限は常にセットで存在する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub borrowed_by: MemberId,
    pub due_date: NaiveDate,
}

/// 書籍の貸出状態
///
/// 不変条件：available ⇔ borrowed_by なし ⇔ due_date なし。
/// 3つの値を列挙型1つにまとめることで、個別に変化する状態を作れないようにする。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoanState {
    #[default]
    Available,
    Borrowed(Loan),
}

/// Book - 蔵書1冊の目録情報と貸出状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub state: LoanState,
}

impl Book {
    /// 新しい書籍（貸出可能状態）
    pub fn new(
        isbn: Isbn,
        title: impl Into<String>,
        author: impl Into<String>,
        year: Option<i32>,
    ) -> Self {
        Self {
            isbn,
            title: title.into(),
            author: author.into(),
            year,
            state: LoanState::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, LoanState::Available)
    }

    pub fn loan(&self) -> Option<&Loan> {
        match &self.state {
            LoanState::Available => None,
            LoanState::Borrowed(loan) => Some(loan),
        }
    }

    pub fn borrowed_by(&self) -> Option<&MemberId> {
        self.loan().map(|loan| &loan.borrowed_by)
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.loan().map(|loan| loan.due_date)
    }

    /// タイトル・著者の部分一致（大文字小文字を区別しない）またはISBNの完全一致
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.author.to_lowercase().contains(&needle)
            || self.isbn.as_str() == keyword
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} [{}] - ", self.title, self.author, self.isbn)?;
        match &self.state {
            LoanState::Available => f.write_str("Available"),
            LoanState::Borrowed(loan) => write!(f, "Borrowed (Due: {})", loan.due_date),
        }
    }
}

// ============================================================================
// 状態遷移（純粋関数）
// ============================================================================

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - Available状態からのみ遷移可能
/// - 返却期限 = 貸出日 + 貸出期間（日単位）
///
/// 副作用なし。新しいBookとイベントを返す。失敗時は元のBookに触れない。
pub fn check_out(
    book: &Book,
    member_id: MemberId,
    borrowed_on: NaiveDate,
    period: LoanPeriod,
) -> Result<(Book, BookCheckedOut), CheckOutError> {
    if !book.is_available() {
        return Err(CheckOutError::AlreadyBorrowed);
    }

    let due_date = period.due_date_from(borrowed_on);

    let new_book = Book {
        state: LoanState::Borrowed(Loan {
            borrowed_by: member_id.clone(),
            due_date,
        }),
        ..book.clone()
    };

    let event = BookCheckedOut {
        isbn: book.isbn.clone(),
        member_id,
        borrowed_on,
        due_date,
    };

    Ok((new_book, event))
}

/// 純粋関数：書籍を返却する
///
/// どの状態からでもAvailableに戻す（冪等）。
/// 既に返却済みかどうかの判定はCatalog側で行う。
pub fn return_book(book: &Book) -> Book {
    Book {
        state: LoanState::Available,
        ..book.clone()
    }
}

/// 純粋関数：延滞判定
///
/// 貸出中かつ、基準日が返却期限より後の場合のみtrue。
pub fn is_overdue(book: &Book, today: NaiveDate) -> bool {
    book.due_date().is_some_and(|due| today > due)
}

/// 純粋関数：延滞料金の算出
///
/// 延滞していなければNone。
pub fn assess_fine(book: &Book, today: NaiveDate, rate: FineRate) -> Option<Fine> {
    let due = book.due_date()?;
    let days_late = (today - due).num_days();
    if days_late <= 0 {
        return None;
    }
    Some(rate.fine_for(days_late.unsigned_abs()))
}
