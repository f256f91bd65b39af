mod diagnostics;
mod health_check;
mod subscribers;
mod subscriptions;
mod unsubscribe;

pub use diagnostics::*;
pub use health_check::*;
pub use subscribers::*;
pub use subscriptions::*;
pub use unsubscribe::*;
