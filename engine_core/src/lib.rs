pub mod app_binding;
pub use app_binding::AppBinding;

pub mod app_loader;
pub use app_loader::load_app;

pub mod native_app;
pub use native_app::NativeApp;

pub mod error;
pub use error::HostError;

pub mod app_utils;
pub mod run_config;
