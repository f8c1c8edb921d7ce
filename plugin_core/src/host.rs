use std::os::raw::c_char;

use crate::error::AppError;
use crate::ffi::{AppInfo, AppStatus, InputInfo, OutputInfo};

/// The capabilities a host offers to a running application.
///
/// Inputs and outputs are addressed by index, in the order the host
/// registered them.
pub trait AppHost {
    fn n_inputs(&self) -> usize;

    fn n_outputs(&self) -> usize;

    /// Reads at most `buf.len()` bytes from `input`. `Ok(0)` is end of stream.
    fn read(&mut self, input: usize, buf: &mut [u8]) -> Result<usize, AppError>;

    /// Offers `buf` to `output` and returns how many bytes it accepted.
    fn write(&mut self, output: usize, buf: &[u8]) -> Result<usize, AppError>;

    /// Marks the application as actively running.
    fn running(&mut self);

    /// Reports the terminal status of the application.
    fn done(&mut self, status: AppStatus);
}

/// `AppHost` backed by the callbacks of a C `AppInfo`.
pub struct RawHost<'a> {
    info: &'a AppInfo,
}

impl<'a> RawHost<'a> {
    pub fn new(info: &'a AppInfo) -> Self {
        Self { info }
    }

    fn input(&self, index: usize) -> Result<&InputInfo, AppError> {
        if index >= self.n_inputs() || self.info.inputs.is_null() {
            return Err(AppError::NoSuchInput(index));
        }
        // SAFETY: the host guarantees `n_inputs` valid entries behind `inputs`.
        Ok(unsafe { &*self.info.inputs.add(index) })
    }

    fn output(&self, index: usize) -> Result<&OutputInfo, AppError> {
        if index >= self.n_outputs() || self.info.outputs.is_null() {
            return Err(AppError::NoSuchOutput(index));
        }
        // SAFETY: the host guarantees `n_outputs` valid entries behind `outputs`.
        Ok(unsafe { &*self.info.outputs.add(index) })
    }
}

impl AppHost for RawHost<'_> {
    fn n_inputs(&self) -> usize {
        self.info.n_inputs as usize
    }

    fn n_outputs(&self) -> usize {
        self.info.n_outputs as usize
    }

    fn read(&mut self, input: usize, buf: &mut [u8]) -> Result<usize, AppError> {
        let slot = self.input(input)?;
        let n = (slot.read)(slot.handle, buf.as_mut_ptr() as *mut c_char, buf.len());
        Ok(n.min(buf.len()))
    }

    fn write(&mut self, output: usize, buf: &[u8]) -> Result<usize, AppError> {
        let slot = self.output(output)?;
        Ok((slot.write)(slot.handle, buf.as_ptr() as *const c_char, buf.len()))
    }

    fn running(&mut self) {
        (self.info.running)(self.info.host)
    }

    fn done(&mut self, status: AppStatus) {
        (self.info.done)(self.info.host, status.as_raw())
    }
}
