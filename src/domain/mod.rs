mod operation_result;
mod subscriber;
mod subscriber_email;
mod subscriber_name;

pub use operation_result::OperationResult;
pub use subscriber::Subscriber;
pub use subscriber_email::email_violations;
pub use subscriber_name::{name_violations, MAX_NAME_LENGTH};
