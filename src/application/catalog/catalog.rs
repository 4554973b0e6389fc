use crate::domain::{
    self, Book, BookCheckedOut, BookReturned, CheckOutError, FineRate, Isbn, LoanPeriod, Member,
    MemberId, RecordBorrowError, commands::*,
};
use crate::ports::CatalogSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::{CatalogError, Result};

/// 蔵書の設定
///
/// 貸出期間と延滞料金はハードコードせず、構築時に注入する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogConfig {
    pub loan_period: LoanPeriod,
    pub fine_rate: FineRate,
}

/// 蔵書の統計（都度計算、キャッシュしない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_books: usize,
    pub available_books: usize,
    pub borrowed_books: usize,
    pub total_members: usize,
}

/// Catalog集約 - すべての書籍と会員を所有する
///
/// 貸出・返却のたびに書籍側と会員側の両方を1回の呼び出しの中で更新する。
/// 新しい状態は純粋関数で先に計算し、両方が成功した場合のみ反映するため、
/// 途中までしか適用されていない状態が外から見えることはない。
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    config: CatalogConfig,
    books: HashMap<Isbn, Book>,
    members: HashMap<MemberId, Member>,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            books: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// デコード済みの書籍・会員から復元する
    ///
    /// 相互参照の整合性は `CatalogSnapshot::decode` で検証済みであること。
    pub fn from_parts(
        config: CatalogConfig,
        books: impl IntoIterator<Item = Book>,
        members: impl IntoIterator<Item = Member>,
    ) -> Self {
        Self {
            config,
            books: books
                .into_iter()
                .map(|book| (book.isbn.clone(), book))
                .collect(),
            members: members
                .into_iter()
                .map(|member| (member.member_id.clone(), member))
                .collect(),
        }
    }

    /// 永続化用のスナップショット
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::encode(self.books.values(), self.members.values())
    }

    pub fn book(&self, isbn: &Isbn) -> Option<&Book> {
        self.books.get(isbn)
    }

    pub fn member(&self, member_id: &MemberId) -> Option<&Member> {
        self.members.get(member_id)
    }

    /// 全書籍（ISBN順）
    pub fn books(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        books
    }

    /// 書籍を蔵書に追加する
    ///
    /// 追加時は常に貸出可能状態。
    pub fn add_book(&mut self, cmd: AddBook) -> Result<Book> {
        if self.books.contains_key(&cmd.isbn) {
            tracing::warn!("Duplicate isbn rejected: {}", cmd.isbn);
            return Err(CatalogError::DuplicateIsbn(cmd.isbn));
        }

        let book = Book::new(cmd.isbn, cmd.title, cmd.author, cmd.year);
        self.books.insert(book.isbn.clone(), book.clone());

        tracing::info!("Book added: {}", book);
        Ok(book)
    }

    /// 会員を登録する
    pub fn register_member(&mut self, cmd: RegisterMember) -> Result<Member> {
        if self.members.contains_key(&cmd.member_id) {
            tracing::warn!("Duplicate member id rejected: {}", cmd.member_id);
            return Err(CatalogError::DuplicateMemberId(cmd.member_id));
        }

        let member = match cmd.max_loans {
            Some(max_loans) => Member::with_max_loans(cmd.member_id, cmd.name, max_loans),
            None => Member::new(cmd.member_id, cmd.name),
        };
        self.members
            .insert(member.member_id.clone(), member.clone());

        tracing::info!("Member registered: {}", member);
        Ok(member)
    }

    /// 書籍を貸し出す
    ///
    /// ビジネスルール：
    /// - 書籍と会員が存在すること
    /// - 会員が貸出上限に達していないこと
    /// - 書籍が貸出可能であること
    ///
    /// # 戻り値
    /// 返却期限を含む貸出イベント（Displayで確認メッセージになる）
    pub fn borrow_book(&mut self, cmd: BorrowBook) -> Result<BookCheckedOut> {
        // 1. 書籍と会員の存在確認
        let book = self
            .books
            .get(&cmd.isbn)
            .ok_or_else(|| CatalogError::BookNotFound(cmd.isbn.clone()))?;
        let member = self
            .members
            .get(&cmd.member_id)
            .ok_or_else(|| CatalogError::MemberNotFound(cmd.member_id.clone()))?;

        // 2. 貸出上限確認
        if !member.can_borrow() {
            tracing::warn!(
                "Member {} reached the borrowing limit ({})",
                member.member_id,
                member.max_loans
            );
            return Err(CatalogError::LimitReached {
                member_id: member.member_id.clone(),
                max_loans: member.max_loans,
            });
        }

        // 3. 書籍側・会員側の新しい状態を計算（まだ反映しない）
        let (new_book, event) = domain::book::check_out(
            book,
            cmd.member_id.clone(),
            cmd.borrowed_on,
            self.config.loan_period,
        )
        .map_err(|CheckOutError::AlreadyBorrowed| {
            tracing::warn!("Book {} is already borrowed", cmd.isbn);
            CatalogError::AlreadyBorrowed(cmd.isbn.clone())
        })?;

        let new_member =
            domain::member::record_borrow(member, cmd.isbn.clone()).map_err(|e| match e {
                RecordBorrowError::LimitReached => CatalogError::LimitReached {
                    member_id: member.member_id.clone(),
                    max_loans: member.max_loans,
                },
                RecordBorrowError::AlreadyHolding => {
                    CatalogError::AlreadyBorrowed(cmd.isbn.clone())
                }
            })?;

        // 4. 両方成功したので反映
        self.books.insert(new_book.isbn.clone(), new_book);
        self.members
            .insert(new_member.member_id.clone(), new_member);

        tracing::info!(
            "Book {} checked out to {}, due {}",
            event.isbn,
            event.member_id,
            event.due_date
        );
        Ok(event)
    }

    /// 書籍を返却する
    ///
    /// ビジネスルール：
    /// - 書籍が存在すること
    /// - 貸出中であること（貸出可能状態の書籍の返却はInvalidReturn）
    /// - 延滞していても返却は受け付け、延滞料金を算出して報告する
    pub fn return_book(&mut self, cmd: ReturnBook) -> Result<BookReturned> {
        // 1. 書籍の存在確認
        let book = self
            .books
            .get(&cmd.isbn)
            .ok_or_else(|| CatalogError::BookNotFound(cmd.isbn.clone()))?;

        // 2. 貸出中であることを確認
        let loan = match book.loan() {
            Some(loan) => loan.clone(),
            None => {
                tracing::warn!("Book {} is not on loan", cmd.isbn);
                return Err(CatalogError::InvalidReturn(cmd.isbn));
            }
        };

        // 3. 延滞料金の算出
        let fine = domain::book::assess_fine(book, cmd.returned_on, self.config.fine_rate);

        // 4. 会員側の記録を更新（記録がなくても返却は続行）
        let new_member = match self.members.get(&loan.borrowed_by) {
            Some(member) => match domain::member::record_return(member, &cmd.isbn) {
                Ok(updated) => Some(updated),
                Err(_) => {
                    tracing::warn!(
                        "Member {} did not list {} as borrowed",
                        loan.borrowed_by,
                        cmd.isbn
                    );
                    None
                }
            },
            None => {
                tracing::warn!(
                    "Borrower {} of {} is not registered",
                    loan.borrowed_by,
                    cmd.isbn
                );
                None
            }
        };

        // 5. 書籍側を返却状態に
        let new_book = domain::book::return_book(book);

        if let Some(member) = new_member {
            self.members.insert(member.member_id.clone(), member);
        }
        self.books.insert(new_book.isbn.clone(), new_book);

        let event = BookReturned {
            isbn: cmd.isbn,
            member_id: loan.borrowed_by,
            returned_on: cmd.returned_on,
            due_date: loan.due_date,
            fine,
        };

        match event.fine {
            Some(fine) => tracing::info!(
                "Book {} returned by {}, {} days late, fine {}",
                event.isbn,
                event.member_id,
                fine.days_late,
                fine.amount
            ),
            None => tracing::info!("Book {} returned by {}", event.isbn, event.member_id),
        }
        Ok(event)
    }

    /// 書籍を検索する
    ///
    /// タイトル・著者の部分一致（大文字小文字を区別しない）またはISBNの完全一致。
    /// 該当なしは空のVec（エラーにはしない）。
    pub fn search_books(&self, keyword: &str) -> Vec<&Book> {
        let matches: Vec<&Book> = self
            .books()
            .into_iter()
            .filter(|book| book.matches_keyword(keyword))
            .collect();

        tracing::debug!("Search {:?} matched {} books", keyword, matches.len());
        matches
    }

    /// 基準日時点で延滞している書籍（ISBN順）
    pub fn overdue_books(&self, today: NaiveDate) -> Vec<&Book> {
        self.books()
            .into_iter()
            .filter(|book| domain::book::is_overdue(book, today))
            .collect()
    }

    /// 統計を計算する
    pub fn statistics(&self) -> Statistics {
        let total_books = self.books.len();
        let available_books = self.books.values().filter(|b| b.is_available()).count();

        Statistics {
            total_books,
            available_books,
            borrowed_books: total_books - available_books,
            total_members: self.members.len(),
        }
    }
}
