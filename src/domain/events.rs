use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Fine, Isbn, MemberId};

/// イベント：書籍が貸し出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCheckedOut {
    pub isbn: Isbn,
    pub member_id: MemberId,
    pub borrowed_on: NaiveDate,
    pub due_date: NaiveDate,
}

/// 利用者向けの確認メッセージ
impl fmt::Display for BookCheckedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book issued. Due date: {}",
            self.due_date.format("%Y-%m-%d")
        )
    }
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub isbn: Isbn,
    pub member_id: MemberId,
    pub returned_on: NaiveDate,
    pub due_date: NaiveDate,
    /// 延滞していた場合のみ
    pub fine: Option<Fine>,
}

impl BookReturned {
    pub fn was_overdue(&self) -> bool {
        self.fine.is_some()
    }
}

impl fmt::Display for BookReturned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fine {
            Some(fine) => write!(
                f,
                "Book returned. Overdue by {} days. Fine: {}",
                fine.days_late, fine.amount
            ),
            None => f.write_str("Book returned successfully"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_out_message_contains_due_date() {
        let event = BookCheckedOut {
            isbn: Isbn::new("111"),
            member_id: MemberId::new("M1"),
            borrowed_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        };
        assert_eq!(event.to_string(), "Book issued. Due date: 2024-03-15");
    }

    #[test]
    fn test_returned_message_reports_fine() {
        let event = BookReturned {
            isbn: Isbn::new("111"),
            member_id: MemberId::new("M1"),
            returned_on: NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            fine: Some(Fine {
                days_late: 3,
                amount: 6,
            }),
        };
        assert!(event.was_overdue());
        assert_eq!(
            event.to_string(),
            "Book returned. Overdue by 3 days. Fine: 6"
        );
    }
}
