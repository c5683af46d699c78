pub mod app;
pub mod config;
pub mod notify;
pub mod render;
pub mod router;
pub mod screens;
pub mod workflow;

pub use app::{AppContext, Page, ScreenScope};
pub use config::AppConfig;
pub use notify::{ConsoleNotifier, Level, MemoryNotifier, Notification, Notifier};
pub use router::{Route, RouteError};
pub use screens::{Navigation, ValidationError, ViewStatus};
pub use workflow::{FailReason, UploadState, UploadWorkflow, WorkflowError};
