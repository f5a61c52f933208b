pub mod member;
pub mod student_approval;

pub use member::*;
pub use student_approval::*;
