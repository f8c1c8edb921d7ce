/// Declares the exported C entry points of an application library.
///
/// Generates `init`, `run`, `data_written` and `drop_completed` as
/// `#[no_mangle] extern "C"` functions that drive `$app` through
/// [`AppInstance`](crate::AppInstance). Use it once, at the root of the
/// application crate:
///
/// ```ignore
/// plugin_core::declare_app!(CopyApp);
/// ```
#[macro_export]
macro_rules! declare_app {
    ($app:ty) => {
        /// # Safety
        /// Called by the host with a valid `AppInfo` and parameter list.
        #[no_mangle]
        pub unsafe extern "C" fn init(
            app: *mut $crate::AppInfo,
            params: $crate::ffi::RawParams,
        ) -> ::std::os::raw::c_int {
            $crate::bridge::init::<$app>(app, params)
        }

        /// # Safety
        /// Called by the host with the `AppInfo` previously passed to `init`.
        #[no_mangle]
        pub unsafe extern "C" fn run(app: *mut $crate::AppInfo) -> ::std::os::raw::c_int {
            $crate::bridge::run::<$app>(app)
        }

        /// # Safety
        /// `data` must point to `n` readable bytes.
        #[no_mangle]
        pub unsafe extern "C" fn data_written(
            app: *mut $crate::AppInfo,
            uid: *const ::std::os::raw::c_char,
            data: *const ::std::os::raw::c_char,
            n: usize,
        ) {
            $crate::bridge::data_written::<$app>(app, uid, data, n)
        }

        /// # Safety
        /// Called by the host with the `AppInfo` previously passed to `init`.
        #[no_mangle]
        pub unsafe extern "C" fn drop_completed(
            app: *mut $crate::AppInfo,
            uid: *const ::std::os::raw::c_char,
            status: ::std::os::raw::c_int,
        ) {
            $crate::bridge::drop_completed::<$app>(app, uid, status)
        }
    };
}
