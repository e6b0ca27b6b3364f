pub mod incident;
pub mod notification;

pub use incident::*;
pub use notification::*;
