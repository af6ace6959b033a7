pub mod ask;
pub mod index;
pub mod insert;
pub mod upload;
