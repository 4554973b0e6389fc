use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Book, BookCheckedOut, BookReturned, Fine, Isbn, Member, MemberId, commands::*,
};

use super::error::ApiError;

// ============================================================================
// Requests
// ============================================================================

/// 書籍追加リクエスト（POST /books）
#[derive(Debug, Serialize, Deserialize)]
pub struct AddBookRequest {
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
}

impl AddBookRequest {
    pub fn to_command(self) -> Result<AddBook, ApiError> {
        Ok(AddBook {
            isbn: parse_isbn(self.isbn)?,
            title: self.title,
            author: self.author,
            year: self.year,
        })
    }
}

/// 会員登録リクエスト（POST /members）
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterMemberRequest {
    pub member_id: String,
    pub name: String,
    /// 省略時は5冊
    #[serde(default)]
    pub max_loans: Option<u32>,
}

impl RegisterMemberRequest {
    pub fn to_command(self) -> Result<RegisterMember, ApiError> {
        Ok(RegisterMember {
            member_id: parse_member_id(self.member_id)?,
            name: self.name,
            max_loans: self.max_loans,
        })
    }
}

/// 貸出リクエスト（POST /books/:isbn/borrow）
#[derive(Debug, Serialize, Deserialize)]
pub struct BorrowBookRequest {
    pub member_id: String,
}

/// 検索クエリ（GET /books?q=）
#[derive(Debug, Deserialize)]
pub struct SearchBooksQuery {
    pub q: Option<String>,
}

pub fn parse_isbn(raw: String) -> Result<Isbn, ApiError> {
    Isbn::try_from(raw).map_err(|_| ApiError::BadRequest("isbn must not be blank".to_string()))
}

pub fn parse_member_id(raw: String) -> Result<MemberId, ApiError> {
    MemberId::try_from(raw)
        .map_err(|_| ApiError::BadRequest("member_id must not be blank".to_string()))
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub available: bool,
    pub borrowed_by: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            isbn: book.isbn.to_string(),
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year,
            available: book.is_available(),
            borrowed_by: book.borrowed_by().map(ToString::to_string),
            due_date: book.due_date(),
        }
    }
}

/// 会員レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub member_id: String,
    pub name: String,
    pub borrowed_isbns: Vec<String>,
    pub max_loans: u32,
    pub can_borrow: bool,
}

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            member_id: member.member_id.to_string(),
            name: member.name.clone(),
            borrowed_isbns: member
                .borrowed_isbns
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_loans: member.max_loans,
            can_borrow: member.can_borrow(),
        }
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookBorrowedResponse {
    pub isbn: String,
    pub member_id: String,
    pub borrowed_on: NaiveDate,
    pub due_date: NaiveDate,
    pub message: String,
}

impl From<BookCheckedOut> for BookBorrowedResponse {
    fn from(event: BookCheckedOut) -> Self {
        Self {
            message: event.to_string(),
            isbn: event.isbn.to_string(),
            member_id: event.member_id.to_string(),
            borrowed_on: event.borrowed_on,
            due_date: event.due_date,
        }
    }
}

/// 返却レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookReturnedResponse {
    pub isbn: String,
    pub member_id: String,
    pub returned_on: NaiveDate,
    pub was_overdue: bool,
    pub fine: Option<Fine>,
    pub message: String,
}

impl From<BookReturned> for BookReturnedResponse {
    fn from(event: BookReturned) -> Self {
        Self {
            message: event.to_string(),
            was_overdue: event.was_overdue(),
            isbn: event.isbn.to_string(),
            member_id: event.member_id.to_string(),
            returned_on: event.returned_on,
            fine: event.fine,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
