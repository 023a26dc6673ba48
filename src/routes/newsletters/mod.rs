mod create;
mod errors;
mod list;

pub use create::*;
pub use errors::CreateNewsletterError;
pub use list::*;
