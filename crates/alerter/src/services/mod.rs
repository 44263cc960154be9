//! External service integrations.

pub mod canvas;
pub mod email;

pub use canvas::CanvasClient;
pub use email::EmailService;
