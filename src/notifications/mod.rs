pub mod dispatcher;
pub mod sender;
pub mod webhook;

pub use dispatcher::NotificationDispatcher;
pub use sender::NotificationSender;
pub use webhook::WebhookSender;
