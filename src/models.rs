pub mod quotes;
pub mod remote;
