pub mod board;
pub mod card;
pub mod column;

pub use board::BoardConfig;
pub use card::{Card, CardId};
pub use column::ColumnKey;
