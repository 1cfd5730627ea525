mod article;
mod outcome;
mod request;

pub use article::ExtractedArticle;
pub use outcome::{Attempt, CascadeResult, FetchOutcome, FetchStatus, UnusableReason};
pub use request::RetrievalRequest;
