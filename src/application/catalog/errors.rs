use crate::domain::{Isbn, MemberId};
use crate::ports::DecodeError;
use thiserror::Error;

/// 蔵書管理アプリケーション層のエラー
///
/// すべて回復可能で、呼び出し側（表示層）が利用者への伝え方を決める。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// 同じISBNの書籍が既に存在する
    #[error("Book {0} already exists")]
    DuplicateIsbn(Isbn),

    /// 同じ会員IDが既に登録されている
    #[error("Member {0} already exists")]
    DuplicateMemberId(MemberId),

    /// 書籍が存在しない
    #[error("Book {0} not found")]
    BookNotFound(Isbn),

    /// 会員が存在しない
    #[error("Member {0} not found")]
    MemberNotFound(MemberId),

    /// 書籍が既に貸出中
    #[error("Book {0} already borrowed")]
    AlreadyBorrowed(Isbn),

    /// 貸出中でない書籍の返却
    #[error("Invalid return: book {0} is not on loan")]
    InvalidReturn(Isbn),

    /// 会員の貸出上限
    #[error("Member {member_id} has reached the borrowing limit ({max_loans} books)")]
    LimitReached { member_id: MemberId, max_loans: u32 },
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogError>;

/// 蔵書の読み込み・保存のエラー
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// CatalogStoreのエラー
    #[error("Catalog store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 保存データが壊れている
    #[error("Corrupt catalog data: {0}")]
    Decode(#[from] DecodeError),
}
