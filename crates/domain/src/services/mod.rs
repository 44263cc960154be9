//! Domain services for pending grade alerts.
//!
//! Services define the seams to the outside world and the logic that runs on
//! domain models between them.

pub mod course_platform;
pub mod mailer;
pub mod registry;
pub mod submission_check;

pub use course_platform::{CoursePlatform, MockCoursePlatform, PlatformError};
pub use mailer::{DeliveryReceipt, MailError, Mailer, MockMailer};
pub use registry::{AlertRegistry, InMemoryAlertRegistry, RegistryError};
pub use submission_check::{check_submissions, PendingCheck};
