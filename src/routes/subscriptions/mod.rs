mod errors;
mod subscribe;

pub use errors::SubscribeError;
pub use subscribe::*;
