use std::os::raw::{c_char, c_int, c_uint, c_void};

/// Terminal and intermediate states an application reports to the host
/// through `AppInfo::done`. Carried across the ABI as a C `int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum AppStatus {
    NotRun = 0,
    Running = 1,
    Finished = 2,
    Error = 3,
}

impl AppStatus {
    pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            0 => Some(AppStatus::NotRun),
            1 => Some(AppStatus::Running),
            2 => Some(AppStatus::Finished),
            3 => Some(AppStatus::Error),
            _ => None,
        }
    }

    pub fn as_raw(self) -> c_int {
        self as c_int
    }
}

/// Status of an input drop, as passed to `drop_completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum DropStatus {
    Initialized = 0,
    Writing = 1,
    Completed = 2,
    Error = 3,
    Expired = 4,
    Deleted = 5,
}

impl DropStatus {
    pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            0 => Some(DropStatus::Initialized),
            1 => Some(DropStatus::Writing),
            2 => Some(DropStatus::Completed),
            3 => Some(DropStatus::Error),
            4 => Some(DropStatus::Expired),
            5 => Some(DropStatus::Deleted),
            _ => None,
        }
    }

    pub fn as_raw(self) -> c_int {
        self as c_int
    }
}

/// Reads at most `n` bytes into `buf`. Returns the number of bytes read,
/// 0 meaning end of stream.
pub type ReadFn = extern "C" fn(handle: *mut c_void, buf: *mut c_char, n: usize) -> usize;

/// Writes up to `n` bytes from `buf`. Returns the number of bytes accepted.
pub type WriteFn = extern "C" fn(handle: *mut c_void, buf: *const c_char, n: usize) -> usize;

/// Tells the host the application is actively running.
pub type RunningFn = extern "C" fn(host: *mut c_void);

/// Reports the terminal `AppStatus` (as an int) to the host.
pub type DoneFn = extern "C" fn(host: *mut c_void, status: c_int);

/// An input endpoint handed to the application by the host.
#[repr(C)]
pub struct InputInfo {
    /// Null-terminated UID of the input drop. May be null.
    pub uid: *const c_char,
    /// Host-owned context passed back to `read`.
    pub handle: *mut c_void,
    pub read: ReadFn,
}

/// An output endpoint handed to the application by the host.
#[repr(C)]
pub struct OutputInfo {
    /// Null-terminated UID of the output drop. May be null.
    pub uid: *const c_char,
    /// Host-owned context passed back to `write`.
    pub handle: *mut c_void,
    pub write: WriteFn,
}

/// Everything the host shares with a loaded application.
///
/// The host fills in every field except `data`, which belongs to the
/// application: it is set by `init` and cleared when the instance is
/// released. The host must treat it as opaque and pass it in null
/// before the first `init`.
///
/// ### Safety
/// - `inputs` / `outputs` point to `n_inputs` / `n_outputs` valid entries
///   (or are null when the count is 0) for the whole lifetime of the app.
/// - `host` is passed back unchanged to `running` and `done`.
#[repr(C)]
pub struct AppInfo {
    pub appname: *const c_char,
    pub uid: *const c_char,
    pub inputs: *const InputInfo,
    pub n_inputs: c_uint,
    pub outputs: *const OutputInfo,
    pub n_outputs: c_uint,
    pub host: *mut c_void,
    pub running: RunningFn,
    pub done: DoneFn,
    pub data: *mut c_void,
}

/// Null-terminated array of `[key, value]` string pairs.
pub type RawParams = *const *const *const c_char;

/// `init(app, params)`: returns 0 on success, non-zero on failure.
pub type InitFn = unsafe extern "C" fn(app: *mut AppInfo, params: RawParams) -> c_int;

/// `run(app)`: returns 0 on success, non-zero on failure.
pub type RunFn = unsafe extern "C" fn(app: *mut AppInfo) -> c_int;

/// `data_written(app, uid, data, n)`: new data arrived on input `uid`.
pub type DataWrittenFn =
    unsafe extern "C" fn(app: *mut AppInfo, uid: *const c_char, data: *const c_char, n: usize);

/// `drop_completed(app, uid, status)`: input `uid` reached a final state.
pub type DropCompletedFn = unsafe extern "C" fn(app: *mut AppInfo, uid: *const c_char, status: c_int);
