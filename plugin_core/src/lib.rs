pub mod app_macros;
pub mod application;
pub mod bridge;
pub mod error;
pub mod ffi;
pub mod host;
pub mod lifecycle;
pub mod local_host;
pub mod logging;
pub mod params;

pub use application::Application;
pub use error::AppError;
pub use ffi::{AppInfo, AppStatus, DropStatus, InputInfo, OutputInfo};
pub use host::AppHost;
pub use lifecycle::{AppInstance, AppState};
pub use local_host::LocalHost;
pub use params::AppParams;
