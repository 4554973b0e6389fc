pub mod book;
pub mod commands;
pub mod errors;
pub mod events;
pub mod member;
pub mod value_objects;

pub use book::{Book, Loan, LoanState};
pub use errors::*;
pub use events::*;
pub use member::{DEFAULT_MAX_LOANS, Member};
pub use value_objects::*;
