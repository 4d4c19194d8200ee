//! Courses: the persisted record, its book, and the state machine driving it.

mod book;
mod flow;
mod model;

pub use book::{CourseBook, SessionOutcome};
pub use flow::{CourseFlow, Phase, RewardOutcome};
pub use model::{Course, CourseItem, CoursePlan, CourseSummary};
