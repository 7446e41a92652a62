pub mod content_type;
pub mod storage;
pub mod upload;
