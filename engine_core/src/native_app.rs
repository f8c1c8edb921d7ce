//! Driving a loaded application through its C entry points.
//!
//! The engine exposes an `AppHost` to the app as an `AppInfo`: every input
//! and output gets a trampoline plus a handle that routes the call back to
//! the host, and `running`/`done` go through the same context. Endpoint
//! errors cannot travel through the C signatures, so they are parked in the
//! context and surfaced once the app returns.

use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::ptr;

use liblogger::{log_debug, log_error, log_warn};
use plugin_core::ffi::{InitFn, RawParams};
use plugin_core::{AppError, AppHost, AppInfo, AppParams, AppStatus, DropStatus, InputInfo, OutputInfo};

use crate::app_binding::AppBinding;
use crate::error::HostError;

pub struct NativeApp {
    binding: AppBinding,
}

impl NativeApp {
    pub fn new(binding: AppBinding) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &AppBinding {
        &self.binding
    }

    /// `init` followed by `run`.
    pub fn execute<H: AppHost>(&self, params: &AppParams, host: &mut H) -> Result<(), HostError> {
        let mut session = Session::new(&self.binding.name, host)?;
        session.init(self.binding.init, params)?;

        let status = unsafe { (self.binding.run)(&mut session.info) };
        log_debug!(&format!("{}: run returned {}", self.binding.name, status));

        session.finish()?;
        if status != 0 {
            return Err(HostError::Run(status));
        }
        Ok(())
    }

    /// `init`, then one `data_written` per chunk of input `uid`, then
    /// `drop_completed` with `DropStatus::Completed`.
    pub fn stream<H, I, C>(&self, params: &AppParams, host: &mut H, uid: &str, chunks: I) -> Result<(), HostError>
    where
        H: AppHost,
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let data_written = self.binding.data_written.ok_or(HostError::MissingSymbol {
            symbol: "data_written",
            source: None,
        })?;
        let drop_completed = self.binding.drop_completed.ok_or(HostError::MissingSymbol {
            symbol: "drop_completed",
            source: None,
        })?;
        let uid = CString::new(uid)?;

        let mut session = Session::new(&self.binding.name, host)?;
        session.init(self.binding.init, params)?;

        for chunk in chunks {
            let chunk = chunk.as_ref();
            unsafe {
                data_written(&mut session.info, uid.as_ptr(), chunk.as_ptr() as *const c_char, chunk.len());
            }
            if session.info.data.is_null() {
                log_warn!(&format!("{}: app finished before its input completed", self.binding.name));
                break;
            }
        }
        if !session.info.data.is_null() {
            unsafe {
                drop_completed(&mut session.info, uid.as_ptr(), DropStatus::Completed.as_raw());
            }
        }

        let status = session.last_status();
        session.finish()?;
        match status {
            Some(AppStatus::Finished) => Ok(()),
            other => Err(HostError::Status(other)),
        }
    }
}

/// What the trampolines reach through `AppInfo::host` and the endpoint handles
struct Context<H> {
    host: *mut H,
    error: Option<AppError>,
    last_status: Option<AppStatus>,
}

impl<H> Context<H> {
    fn park(&mut self, e: AppError) {
        log_error!(&format!("endpoint failed: {}", e));
        if self.error.is_none() {
            self.error = Some(e);
        }
    }
}

struct Endpoint<H> {
    context: *mut Context<H>,
    index: usize,
}

/// Owns everything an `AppInfo` points into, for one lifecycle.
struct Session<'h, H> {
    info: AppInfo,
    context: Box<Context<H>>,
    _endpoints: Vec<Endpoint<H>>,
    _inputs: Vec<InputInfo>,
    _outputs: Vec<OutputInfo>,
    _name: CString,
    _host: PhantomData<&'h mut H>,
}

impl<'h, H: AppHost> Session<'h, H> {
    fn new(name: &str, host: &'h mut H) -> Result<Self, HostError> {
        let name = CString::new(name)?;
        let n_inputs = host.n_inputs();
        let n_outputs = host.n_outputs();

        let mut context = Box::new(Context {
            host: host as *mut H,
            error: None,
            last_status: None,
        });
        let context_ptr: *mut Context<H> = &mut *context;

        let endpoints: Vec<Endpoint<H>> = (0..n_inputs)
            .chain(0..n_outputs)
            .map(|index| Endpoint { context: context_ptr, index })
            .collect();
        let handle = |i: usize| &endpoints[i] as *const Endpoint<H> as *mut c_void;

        let inputs: Vec<InputInfo> = (0..n_inputs)
            .map(|i| InputInfo {
                uid: ptr::null(),
                handle: handle(i),
                read: read_input::<H>,
            })
            .collect();
        let outputs: Vec<OutputInfo> = (0..n_outputs)
            .map(|i| OutputInfo {
                uid: ptr::null(),
                handle: handle(n_inputs + i),
                write: write_output::<H>,
            })
            .collect();

        let info = AppInfo {
            appname: name.as_ptr(),
            uid: name.as_ptr(),
            inputs: if inputs.is_empty() { ptr::null() } else { inputs.as_ptr() },
            n_inputs: n_inputs as c_uint,
            outputs: if outputs.is_empty() { ptr::null() } else { outputs.as_ptr() },
            n_outputs: n_outputs as c_uint,
            host: context_ptr as *mut c_void,
            running: on_running::<H>,
            done: on_done::<H>,
            data: ptr::null_mut(),
        };

        Ok(Self {
            info,
            context,
            _endpoints: endpoints,
            _inputs: inputs,
            _outputs: outputs,
            _name: name,
            _host: PhantomData,
        })
    }

    fn init(&mut self, init: InitFn, params: &AppParams) -> Result<(), HostError> {
        let raw = RawParamList::new(params)?;
        let status = unsafe { init(&mut self.info, raw.as_ptr()) };
        if status != 0 {
            return Err(HostError::Init(status));
        }
        Ok(())
    }

    fn last_status(&self) -> Option<AppStatus> {
        self.context.last_status
    }

    /// Surfaces a parked endpoint error, if any
    fn finish(mut self) -> Result<(), HostError> {
        if !self.info.data.is_null() {
            log_warn!("app did not release its instance state");
        }
        match self.context.error.take() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Owned copy of the parameters in the sentinel-terminated C layout
struct RawParamList {
    _strings: Vec<CString>,
    _pairs: Vec<[*const c_char; 2]>,
    list: Vec<*const *const c_char>,
}

impl RawParamList {
    fn new(params: &AppParams) -> Result<Self, HostError> {
        let mut strings = Vec::with_capacity(params.len() * 2);
        for (key, value) in params.iter() {
            strings.push(CString::new(key)?);
            strings.push(CString::new(value)?);
        }
        let pairs: Vec<[*const c_char; 2]> = strings
            .chunks(2)
            .map(|kv| [kv[0].as_ptr(), kv[1].as_ptr()])
            .collect();
        let mut list: Vec<*const *const c_char> = pairs.iter().map(|pair| pair.as_ptr()).collect();
        list.push(ptr::null());

        Ok(Self {
            _strings: strings,
            _pairs: pairs,
            list,
        })
    }

    fn as_ptr(&self) -> RawParams {
        self.list.as_ptr()
    }
}

extern "C" fn read_input<H: AppHost>(handle: *mut c_void, buf: *mut c_char, n: usize) -> usize {
    if handle.is_null() || buf.is_null() || n == 0 {
        return 0;
    }
    // SAFETY: handles are `Endpoint`s owned by the live `Session`, and the
    // app hands us a buffer of `n` writable bytes.
    unsafe {
        let endpoint = &*(handle as *const Endpoint<H>);
        let context = &mut *endpoint.context;
        let buf = std::slice::from_raw_parts_mut(buf as *mut u8, n);
        match (*context.host).read(endpoint.index, buf) {
            Ok(read) => read,
            Err(e) => {
                context.park(e);
                0
            }
        }
    }
}

extern "C" fn write_output<H: AppHost>(handle: *mut c_void, buf: *const c_char, n: usize) -> usize {
    if handle.is_null() || buf.is_null() || n == 0 {
        return 0;
    }
    // SAFETY: as for `read_input`; the buffer holds `n` readable bytes.
    unsafe {
        let endpoint = &*(handle as *const Endpoint<H>);
        let context = &mut *endpoint.context;
        let buf = std::slice::from_raw_parts(buf as *const u8, n);
        match (*context.host).write(endpoint.index, buf) {
            Ok(written) => written,
            Err(e) => {
                context.park(e);
                0
            }
        }
    }
}

extern "C" fn on_running<H: AppHost>(ctx: *mut c_void) {
    if ctx.is_null() {
        return;
    }
    // SAFETY: `ctx` is the `Context` of the live `Session`.
    unsafe {
        let context = &mut *(ctx as *mut Context<H>);
        (*context.host).running();
    }
}

extern "C" fn on_done<H: AppHost>(ctx: *mut c_void, status: c_int) {
    if ctx.is_null() {
        return;
    }
    // SAFETY: `ctx` is the `Context` of the live `Session`.
    unsafe {
        let context = &mut *(ctx as *mut Context<H>);
        match AppStatus::from_raw(status) {
            Some(status) => {
                // the app saw a failed endpoint as end of stream
                let status = match (status, &context.error) {
                    (AppStatus::Finished, Some(_)) => AppStatus::Error,
                    (status, _) => status,
                };
                context.last_status = Some(status);
                (*context.host).done(status);
            }
            None => log_warn!(&format!("app reported unknown status {}", status)),
        }
    }
}
