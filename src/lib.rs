//! todos is a small personal to-do list kept in a plain text file
//!
//! - one item per line, the whole file rewritten after every change
//! - a prompt loop that understands abbreviations and synonyms
//!   (`a`, `n`, `new` for add; `d`, `disp` for show; `x`, `exit` for quit)
//! - a web page that re-renders after every change, plus a JSON API
//!
pub mod action;
pub mod config;
pub mod error;
pub mod larch;
pub mod list;
pub mod logging;
pub mod shell;
pub mod store;
pub mod web;

pub use action::{normalize_action, Action};
pub use config::Config;
pub use error::{Result, TodoError};
pub use list::{cap_first, parse_item_number, TodoList};
pub use store::TodoStore;
