mod create;
mod errors;

pub use create::*;
pub use errors::CreateIssueError;
