// HR workflow: job postings, potential-fit tagging triggers, application review.

pub mod applications;
pub mod handlers;
pub mod jobs;
