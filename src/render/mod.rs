pub mod compose;
pub mod highlight;
pub mod sched;
