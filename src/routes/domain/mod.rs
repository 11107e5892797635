mod subscriber_email;
mod subscription_request;

pub use subscriber_email::*;
pub use subscription_request::*;
