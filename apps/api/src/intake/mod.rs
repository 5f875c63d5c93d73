// Application intake: multipart submission, resume text extraction, one-shot scoring.

pub mod extract;
pub mod handlers;
pub mod submission;
