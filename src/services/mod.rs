pub mod submission_guard;
pub mod unresolved_writer;

pub use submission_guard::SubmissionGuard;
pub use unresolved_writer::UnresolvedWriter;
