pub mod event;
pub mod job;
pub mod outcome;
pub mod page;
