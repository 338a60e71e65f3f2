pub mod job_store;
pub mod ocr;
pub mod redis_store;
pub mod results;
