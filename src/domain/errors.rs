/// 貸出（チェックアウト）のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutError {
    /// 既に貸出中
    AlreadyBorrowed,
}

/// 会員側の貸出記録のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBorrowError {
    /// 貸出上限に達している
    LimitReached,
    /// 同じISBNを既に借りている
    AlreadyHolding,
}

/// 会員側の返却記録のエラー（致命的ではない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordReturnError {
    /// このISBNは会員の貸出記録にない
    NotFound,
}
