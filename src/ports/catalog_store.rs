use crate::domain::{Book, DEFAULT_MAX_LOANS, Isbn, Loan, LoanState, Member, MemberId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍の永続化レコード
///
/// books.json の値1件分。ISBNをキーとするマップに格納される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub available: bool,
    pub borrowed_by: Option<String>,
    /// YYYY-MM-DD
    pub due_date: Option<NaiveDate>,
}

/// 会員の永続化レコード
///
/// members.json の値1件分。会員IDをキーとするマップに格納される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub name: String,
    pub member_id: String,
    #[serde(default)]
    pub borrowed_isbns: Vec<String>,
    #[serde(default = "default_max_loans")]
    pub max_loans: u32,
}

fn default_max_loans() -> u32 {
    DEFAULT_MAX_LOANS
}

/// 蔵書全体のスナップショット
///
/// 起動時に読み込み、終了時に保存する単位。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub books: BTreeMap<String, BookRecord>,
    pub members: BTreeMap<String, MemberRecord>,
}

/// 永続化データのデコードエラー
///
/// 壊れたデータは読み込み時点で明確に失敗させる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("book record has a blank isbn")]
    BlankIsbn,

    #[error("member record has a blank member id")]
    BlankMemberId,

    #[error("book {isbn}: available, borrowedBy and dueDate disagree")]
    InconsistentLoanState { isbn: String },

    #[error("record keyed by {key} carries id {record_id}")]
    KeyMismatch { key: String, record_id: String },

    #[error("member {member_id} lists {isbn} more than once")]
    DuplicateBorrowedIsbn { member_id: String, isbn: String },

    #[error("member {member_id} holds {count} books but the limit is {max_loans}")]
    LoanLimitExceeded {
        member_id: String,
        count: usize,
        max_loans: u32,
    },

    #[error("member {member_id} lists {isbn}, which is not on loan to them")]
    DanglingLoan { member_id: String, isbn: String },

    #[error("book {isbn} is on loan to {member_id}, who does not list it")]
    UnrecordedLoan { isbn: String, member_id: String },
}

// ============================================================================
// エンコード（ドメイン → レコード）
// ============================================================================

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        let (borrowed_by, due_date) = match &book.state {
            LoanState::Available => (None, None),
            LoanState::Borrowed(loan) => (
                Some(loan.borrowed_by.as_str().to_string()),
                Some(loan.due_date),
            ),
        };

        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.as_str().to_string(),
            year: book.year,
            available: book.is_available(),
            borrowed_by,
            due_date,
        }
    }
}

impl From<&Member> for MemberRecord {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            member_id: member.member_id.as_str().to_string(),
            borrowed_isbns: member
                .borrowed_isbns
                .iter()
                .map(|isbn| isbn.as_str().to_string())
                .collect(),
            max_loans: member.max_loans,
        }
    }
}

// ============================================================================
// デコード（レコード → ドメイン）
// ============================================================================

impl TryFrom<BookRecord> for Book {
    type Error = DecodeError;

    fn try_from(record: BookRecord) -> std::result::Result<Self, Self::Error> {
        let isbn = Isbn::try_from(record.isbn).map_err(|_| DecodeError::BlankIsbn)?;

        let state = match (record.available, record.borrowed_by, record.due_date) {
            (true, None, None) => LoanState::Available,
            (false, Some(borrowed_by), Some(due_date)) => LoanState::Borrowed(Loan {
                borrowed_by: MemberId::try_from(borrowed_by)
                    .map_err(|_| DecodeError::BlankMemberId)?,
                due_date,
            }),
            _ => {
                return Err(DecodeError::InconsistentLoanState {
                    isbn: isbn.as_str().to_string(),
                });
            }
        };

        Ok(Book {
            isbn,
            title: record.title,
            author: record.author,
            year: record.year,
            state,
        })
    }
}

impl TryFrom<MemberRecord> for Member {
    type Error = DecodeError;

    fn try_from(record: MemberRecord) -> std::result::Result<Self, Self::Error> {
        let member_id =
            MemberId::try_from(record.member_id).map_err(|_| DecodeError::BlankMemberId)?;

        let mut borrowed_isbns = BTreeSet::new();
        for raw in record.borrowed_isbns {
            let isbn = Isbn::try_from(raw).map_err(|_| DecodeError::BlankIsbn)?;
            if borrowed_isbns.contains(&isbn) {
                return Err(DecodeError::DuplicateBorrowedIsbn {
                    member_id: member_id.as_str().to_string(),
                    isbn: isbn.as_str().to_string(),
                });
            }
            borrowed_isbns.insert(isbn);
        }

        if borrowed_isbns.len() > record.max_loans as usize {
            return Err(DecodeError::LoanLimitExceeded {
                member_id: member_id.as_str().to_string(),
                count: borrowed_isbns.len(),
                max_loans: record.max_loans,
            });
        }

        Ok(Member {
            member_id,
            name: record.name,
            borrowed_isbns,
            max_loans: record.max_loans,
        })
    }
}

impl CatalogSnapshot {
    /// ドメインの書籍・会員からスナップショットを作る
    pub fn encode<'a>(
        books: impl IntoIterator<Item = &'a Book>,
        members: impl IntoIterator<Item = &'a Member>,
    ) -> Self {
        Self {
            books: books
                .into_iter()
                .map(|book| (book.isbn.as_str().to_string(), BookRecord::from(book)))
                .collect(),
            members: members
                .into_iter()
                .map(|member| {
                    (
                        member.member_id.as_str().to_string(),
                        MemberRecord::from(member),
                    )
                })
                .collect(),
        }
    }

    /// スナップショットをドメインの書籍・会員に戻す
    ///
    /// マップのキーとレコード内のIDが一致すること、
    /// 書籍と会員の貸出記録が相互に一致することを検証する。
    pub fn decode(self) -> std::result::Result<(Vec<Book>, Vec<Member>), DecodeError> {
        let mut books = Vec::with_capacity(self.books.len());
        for (key, record) in self.books {
            if key != record.isbn {
                return Err(DecodeError::KeyMismatch {
                    key,
                    record_id: record.isbn,
                });
            }
            books.push(Book::try_from(record)?);
        }

        let mut members = Vec::with_capacity(self.members.len());
        for (key, record) in self.members {
            if key != record.member_id {
                return Err(DecodeError::KeyMismatch {
                    key,
                    record_id: record.member_id,
                });
            }
            members.push(Member::try_from(record)?);
        }

        verify_cross_references(&books, &members)?;

        Ok((books, members))
    }
}

/// 書籍側の貸出先と会員側の貸出記録が一致しているか検証する
fn verify_cross_references(
    books: &[Book],
    members: &[Member],
) -> std::result::Result<(), DecodeError> {
    for member in members {
        for isbn in &member.borrowed_isbns {
            let on_loan_to_member = books
                .iter()
                .find(|book| &book.isbn == isbn)
                .and_then(Book::borrowed_by)
                .is_some_and(|borrower| borrower == &member.member_id);

            if !on_loan_to_member {
                return Err(DecodeError::DanglingLoan {
                    member_id: member.member_id.as_str().to_string(),
                    isbn: isbn.as_str().to_string(),
                });
            }
        }
    }

    for book in books {
        if let Some(borrower) = book.borrowed_by() {
            let recorded = members
                .iter()
                .find(|member| &member.member_id == borrower)
                .is_some_and(|member| member.is_holding(&book.isbn));

            if !recorded {
                return Err(DecodeError::UnrecordedLoan {
                    isbn: book.isbn.as_str().to_string(),
                    member_id: borrower.as_str().to_string(),
                });
            }
        }
    }

    Ok(())
}

/// 蔵書ストアポート
///
/// 蔵書スナップショットの永続化を抽象化する。
/// コアは起動時の読み込みと終了時の保存の間、メモリ上だけで動作する。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 保存済みのスナップショットを読み込む
    ///
    /// まだ何も保存されていない場合は空のスナップショットを返す。
    async fn load(&self) -> Result<CatalogSnapshot>;

    /// スナップショットを保存する（既存の内容は置き換える）
    async fn save(&self, snapshot: &CatalogSnapshot) -> Result<()>;
}
