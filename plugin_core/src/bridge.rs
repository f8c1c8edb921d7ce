//! Generic bodies of the exported C entry points.
//!
//! `declare_app!` forwards each `extern "C"` symbol to one of these. They own
//! the only pointer casts in the contract: the boxed `AppInstance<A>` lives
//! in `AppInfo::data` between `init` and the end of the lifecycle, and is
//! dropped (with `data` reset to null) as soon as the instance finishes.
//! Panics are caught here and never cross the C boundary.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use crate::application::Application;
use crate::error::AppError;
use crate::ffi::{AppInfo, AppStatus, DropStatus, RawParams};
use crate::host::{AppHost, RawHost};
use crate::lifecycle::{AppInstance, AppState};
use crate::params::AppParams;

const SUCCESS: c_int = 0;
const FAILURE: c_int = 1;

/// # Safety
/// `app` must be null or point to a valid `AppInfo`; `params` must satisfy
/// [`AppParams::from_raw`].
pub unsafe fn init<A: Application>(app: *mut AppInfo, params: RawParams) -> c_int {
    if app.is_null() {
        report::<A>(&AppError::NullPointer("app info"));
        return FAILURE;
    }
    let live = (*app).data as *const AppInstance<A>;
    if !live.is_null() {
        report::<A>(&AppError::InvalidState {
            operation: "initialize",
            state: (*live).state(),
        });
        return FAILURE;
    }

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let params = AppParams::from_raw(params);
        let mut instance = AppInstance::<A>::new();
        instance.initialize(&params)?;
        Ok::<_, AppError>(instance)
    }))
    .unwrap_or_else(|payload| Err(AppError::from_panic(payload)));

    match outcome {
        Ok(instance) => {
            (*app).data = Box::into_raw(Box::new(instance)) as *mut c_void;
            SUCCESS
        }
        Err(e) => {
            report::<A>(&e);
            FAILURE
        }
    }
}

/// # Safety
/// `app` must be null or a valid `AppInfo` previously passed to [`init`].
pub unsafe fn run<A: Application>(app: *mut AppInfo) -> c_int {
    if !app.is_null() {
        liblogger::log_debug!(&format!(
            "{}: running / done callbacks at {:p} / {:p}",
            A::NAME,
            (*app).running as *const (),
            (*app).done as *const ()
        ));
    }
    let result = with_instance::<A, _>(app, "run", |instance, host| instance.run(host));
    match result {
        Ok(()) => SUCCESS,
        Err(e) => {
            report::<A>(&e);
            FAILURE
        }
    }
}

/// # Safety
/// As for [`run`]; `uid` must be null or a C string and `data` must point to
/// `n` readable bytes.
pub unsafe fn data_written<A: Application>(app: *mut AppInfo, uid: *const c_char, data: *const c_char, n: usize) {
    let uid = c_str_or_empty(uid);
    let data: &[u8] = if data.is_null() || n == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data as *const u8, n)
    };

    if let Err(e) = with_instance::<A, _>(app, "data_written", |instance, host| {
        instance.data_written(host, &uid, data)
    }) {
        report::<A>(&e);
    }
}

/// # Safety
/// As for [`run`]; `uid` must be null or a C string.
pub unsafe fn drop_completed<A: Application>(app: *mut AppInfo, uid: *const c_char, status: c_int) {
    let uid = c_str_or_empty(uid);
    let status = DropStatus::from_raw(status).unwrap_or_else(|| {
        liblogger::log_warn!(&format!("{}: unknown drop status {}, treating as Error", A::NAME, status));
        DropStatus::Error
    });

    if let Err(e) = with_instance::<A, _>(app, "drop_completed", |instance, host| {
        instance.drop_completed(host, &uid, status)
    }) {
        report::<A>(&e);
    }
}

/// Borrows the instance stored in `app.data`, runs `f` against it, and
/// releases the instance once it has finished.
unsafe fn with_instance<A, F>(app: *mut AppInfo, what: &'static str, f: F) -> Result<(), AppError>
where
    A: Application,
    F: FnOnce(&mut AppInstance<A>, &mut RawHost<'_>) -> Result<(), AppError>,
{
    if app.is_null() {
        return Err(AppError::NullPointer("app info"));
    }
    let slot = (*app).data as *mut AppInstance<A>;
    if slot.is_null() {
        return Err(AppError::NoInstance(what));
    }

    let (result, finished) = {
        let info: &AppInfo = &*app;
        let instance: &mut AppInstance<A> = &mut *slot;
        let mut host = RawHost::new(info);
        match catch_unwind(AssertUnwindSafe(|| f(&mut *instance, &mut host))) {
            Ok(result) => (result, instance.state() == AppState::Finished),
            Err(payload) => {
                // The instance may be half-way through a transition; give up on it.
                if instance.state() != AppState::Finished {
                    host.done(AppStatus::Error);
                }
                (Err(AppError::from_panic(payload)), true)
            }
        }
    };

    if finished {
        drop(Box::from_raw(slot));
        (*app).data = ptr::null_mut();
    }
    result
}

unsafe fn c_str_or_empty(s: *const c_char) -> String {
    if s.is_null() {
        String::new()
    } else {
        CStr::from_ptr(s).to_string_lossy().into_owned()
    }
}

fn report<A: Application>(e: &AppError) {
    liblogger::log_error!(&format!("{}: {}", A::NAME, e));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    /// What the host side of a hand-built `AppInfo` was told
    #[derive(Default)]
    struct Recorder {
        running: usize,
        done: Vec<c_int>,
    }

    extern "C" fn on_running(host: *mut c_void) {
        unsafe { (*(host as *mut Recorder)).running += 1 }
    }

    extern "C" fn on_done(host: *mut c_void, status: c_int) {
        unsafe { (*(host as *mut Recorder)).done.push(status) }
    }

    fn app_info(recorder: &mut Recorder) -> AppInfo {
        AppInfo {
            appname: ptr::null(),
            uid: ptr::null(),
            inputs: ptr::null(),
            n_inputs: 0,
            outputs: ptr::null(),
            n_outputs: 0,
            host: recorder as *mut Recorder as *mut c_void,
            running: on_running,
            done: on_done,
            data: ptr::null_mut(),
        }
    }

    /// Panics or fails where its parameters say so
    struct Scripted {
        panic_in_run: bool,
    }

    impl Application for Scripted {
        const NAME: &'static str = "scripted";

        fn initialize(params: &AppParams) -> Result<Self, AppError> {
            if params.get("panic") == Some("init") {
                panic!("init blew up");
            }
            Ok(Scripted {
                panic_in_run: params.get("panic") == Some("run"),
            })
        }

        fn run(&mut self, _host: &mut dyn AppHost) -> Result<(), AppError> {
            if self.panic_in_run {
                panic!("run blew up");
            }
            Ok(())
        }

        fn on_drop_completed(self, _host: &mut dyn AppHost, _uid: &str, status: DropStatus) -> Result<(), AppError> {
            match status {
                DropStatus::Completed => Ok(()),
                _ => Err(AppError::MissingInput),
            }
        }
    }

    /// Calls `init` with `pairs` laid out as a C parameter list
    unsafe fn init_with(info: &mut AppInfo, pairs: &[(&str, &str)]) -> c_int {
        let strings: Vec<(CString, CString)> = pairs
            .iter()
            .map(|(k, v)| (CString::new(*k).unwrap(), CString::new(*v).unwrap()))
            .collect();
        let entries: Vec<[*const c_char; 2]> = strings.iter().map(|(k, v)| [k.as_ptr(), v.as_ptr()]).collect();
        let mut list: Vec<*const *const c_char> = entries.iter().map(|e| e.as_ptr()).collect();
        list.push(ptr::null());
        init::<Scripted>(info, list.as_ptr())
    }

    const FINISHED: c_int = 2;
    const ERROR: c_int = 3;

    #[test]
    fn null_app_info_is_rejected() {
        unsafe {
            assert_eq!(init::<Scripted>(ptr::null_mut(), ptr::null()), FAILURE);
            assert_eq!(run::<Scripted>(ptr::null_mut()), FAILURE);
            data_written::<Scripted>(ptr::null_mut(), ptr::null(), ptr::null(), 0);
            drop_completed::<Scripted>(ptr::null_mut(), ptr::null(), 2);
        }
    }

    #[test]
    fn run_before_init_signals_nothing() {
        let mut recorder = Recorder::default();
        let mut info = app_info(&mut recorder);
        assert_eq!(unsafe { run::<Scripted>(&mut info) }, FAILURE);
        assert!(info.data.is_null());
        assert_eq!(recorder.running, 0);
        assert!(recorder.done.is_empty());
    }

    #[test]
    fn run_releases_the_instance() {
        let mut recorder = Recorder::default();
        let mut info = app_info(&mut recorder);
        unsafe {
            assert_eq!(init_with(&mut info, &[]), SUCCESS);
            assert!(!info.data.is_null());
            assert_eq!(run::<Scripted>(&mut info), SUCCESS);
            assert!(info.data.is_null());
            // nothing left to run
            assert_eq!(run::<Scripted>(&mut info), FAILURE);
            let again = with_instance::<Scripted, _>(&mut info, "run", |instance, host| instance.run(host));
            assert!(matches!(again, Err(AppError::NoInstance("run"))));
        }
        assert_eq!(recorder.running, 1);
        assert_eq!(recorder.done, vec![FINISHED]);
    }

    #[test]
    fn second_init_keeps_the_live_instance() {
        let mut recorder = Recorder::default();
        let mut info = app_info(&mut recorder);
        unsafe {
            assert_eq!(init_with(&mut info, &[]), SUCCESS);
            let live = info.data;
            assert_eq!(init_with(&mut info, &[("panic", "run")]), FAILURE);
            assert_eq!(info.data, live);
            // still the first instance, which does not panic
            assert_eq!(run::<Scripted>(&mut info), SUCCESS);
        }
        assert_eq!(recorder.done, vec![FINISHED]);
    }

    #[test]
    fn panic_in_init_leaves_no_instance() {
        let mut recorder = Recorder::default();
        let mut info = app_info(&mut recorder);
        assert_eq!(unsafe { init_with(&mut info, &[("panic", "init")]) }, FAILURE);
        assert!(info.data.is_null());
        assert!(recorder.done.is_empty());
    }

    #[test]
    fn panic_in_run_reports_error_once_and_releases() {
        let mut recorder = Recorder::default();
        let mut info = app_info(&mut recorder);
        unsafe {
            assert_eq!(init_with(&mut info, &[("panic", "run")]), SUCCESS);
            assert_eq!(run::<Scripted>(&mut info), FAILURE);
        }
        assert!(info.data.is_null());
        assert_eq!(recorder.running, 1);
        assert_eq!(recorder.done, vec![ERROR]);
    }

    #[test]
    fn notifications_then_completed_drop_finish() {
        let mut recorder = Recorder::default();
        let mut info = app_info(&mut recorder);
        let uid = CString::new("in-1").unwrap();
        unsafe {
            assert_eq!(init_with(&mut info, &[]), SUCCESS);
            data_written::<Scripted>(&mut info, uid.as_ptr(), b"abc".as_ptr() as *const c_char, 3);
            data_written::<Scripted>(&mut info, uid.as_ptr(), ptr::null(), 0);
            assert!(!info.data.is_null());
            drop_completed::<Scripted>(&mut info, uid.as_ptr(), DropStatus::Completed.as_raw());
        }
        assert!(info.data.is_null());
        assert_eq!(recorder.running, 1);
        assert_eq!(recorder.done, vec![FINISHED]);
    }

    #[test]
    fn unknown_drop_status_counts_as_error() {
        let mut recorder = Recorder::default();
        let mut info = app_info(&mut recorder);
        unsafe {
            assert_eq!(init_with(&mut info, &[]), SUCCESS);
            drop_completed::<Scripted>(&mut info, ptr::null(), 42);
        }
        assert!(info.data.is_null());
        assert_eq!(recorder.done, vec![ERROR]);
    }
}
