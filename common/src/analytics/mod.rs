pub mod client;
pub mod statements;
