mod health_check;
pub mod helpers;
mod issues;
mod newsletters;
mod subscriptions;

pub use health_check::*;
pub use issues::*;
pub use newsletters::*;
pub use subscriptions::*;
