//! Converters from raw wire shapes to normalized records.

mod browser;
mod console;
mod exception;
mod stack;
mod test_log;

pub use browser::convert_log_entry;
pub use console::{Converted, convert_console_call};
pub use exception::convert_exception;
pub use stack::{format_stack, stack_for};
pub use test_log::convert_test_log;
