use std::path::{Path, PathBuf};

/// Returns the filename of the app library based on platform (e.g., libfoo.so, foo.dll, libfoo.dylib)
pub fn resolve_app_filename(name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.dll", name)
    } else if cfg!(target_os = "macos") {
        format!("lib{}.dylib", name)
    } else {
        format!("lib{}.so", name)
    }
}

/// Combines the folder and resolved filename into a full path.
pub fn resolve_app_binary_path<P: AsRef<Path>>(folder: P, name: &str) -> PathBuf {
    folder.as_ref().join(resolve_app_filename(name))
}
