use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Isbn, MemberId};

/// コマンド：書籍を蔵書に追加する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBook {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
}

/// コマンド：会員を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMember {
    pub member_id: MemberId,
    pub name: String,
    /// 省略時は標準の上限（5冊）
    pub max_loans: Option<u32>,
}

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub isbn: Isbn,
    pub member_id: MemberId,
    pub borrowed_on: NaiveDate,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub isbn: Isbn,
    pub returned_on: NaiveDate,
}
