//! Command implementations, one module per subcommand

pub mod branch;
pub mod checkout;
pub mod commit;
pub mod file_history;
pub mod gc;
pub mod init;
pub mod log;
pub mod merge;
pub mod merge_branch;
pub mod play;
pub mod search;
pub mod switch;
