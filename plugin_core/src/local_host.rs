use std::io::{ErrorKind, Read, Write};

use crate::error::AppError;
use crate::ffi::AppStatus;
use crate::host::AppHost;

/// In-process host over `std::io` endpoints.
///
/// Records every lifecycle signal it receives so callers can check what the
/// application reported.
pub struct LocalHost<'a> {
    inputs: Vec<Box<dyn Read + 'a>>,
    outputs: Vec<Box<dyn Write + 'a>>,
    running_calls: usize,
    statuses: Vec<AppStatus>,
}

impl<'a> LocalHost<'a> {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            running_calls: 0,
            statuses: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: impl Read + 'a) -> Self {
        self.inputs.push(Box::new(input));
        self
    }

    pub fn with_output(mut self, output: impl Write + 'a) -> Self {
        self.outputs.push(Box::new(output));
        self
    }

    pub fn add_input(&mut self, input: impl Read + 'a) {
        self.inputs.push(Box::new(input));
    }

    pub fn add_output(&mut self, output: impl Write + 'a) {
        self.outputs.push(Box::new(output));
    }

    /// How many times `running()` was signalled
    pub fn running_calls(&self) -> usize {
        self.running_calls
    }

    /// Every status passed to `done()`, in order
    pub fn statuses(&self) -> &[AppStatus] {
        &self.statuses
    }

    /// The last status passed to `done()`, if any
    pub fn final_status(&self) -> Option<AppStatus> {
        self.statuses.last().copied()
    }

    pub fn flush_outputs(&mut self) -> Result<(), AppError> {
        for (output, sink) in self.outputs.iter_mut().enumerate() {
            sink.flush().map_err(|source| AppError::Write { output, source })?;
        }
        Ok(())
    }
}

impl Default for LocalHost<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl AppHost for LocalHost<'_> {
    fn n_inputs(&self) -> usize {
        self.inputs.len()
    }

    fn n_outputs(&self) -> usize {
        self.outputs.len()
    }

    fn read(&mut self, input: usize, buf: &mut [u8]) -> Result<usize, AppError> {
        let source = self.inputs.get_mut(input).ok_or(AppError::NoSuchInput(input))?;
        loop {
            match source.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => return Err(AppError::Read { input, source }),
            }
        }
    }

    fn write(&mut self, output: usize, buf: &[u8]) -> Result<usize, AppError> {
        let sink = self.outputs.get_mut(output).ok_or(AppError::NoSuchOutput(output))?;
        sink.write_all(buf)
            .map_err(|source| AppError::Write { output, source })?;
        Ok(buf.len())
    }

    fn running(&mut self) {
        self.running_calls += 1;
    }

    fn done(&mut self, status: AppStatus) {
        self.statuses.push(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_by_index() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        {
            let mut host = LocalHost::new()
                .with_input(&b"abc"[..])
                .with_output(&mut first)
                .with_output(&mut second);

            let mut buf = [0u8; 8];
            let n = host.read(0, &mut buf).unwrap();
            assert_eq!(&buf[..n], b"abc");
            assert_eq!(host.write(1, &buf[..n]).unwrap(), 3);
            assert!(matches!(host.read(1, &mut buf), Err(AppError::NoSuchInput(1))));
            assert!(matches!(host.write(2, b"x"), Err(AppError::NoSuchOutput(2))));
        }
        assert!(first.is_empty());
        assert_eq!(second, b"abc");
    }

    #[test]
    fn records_lifecycle_signals() {
        let mut host = LocalHost::new();
        host.running();
        host.done(AppStatus::Finished);
        assert_eq!(host.running_calls(), 1);
        assert_eq!(host.statuses(), &[AppStatus::Finished]);
        assert_eq!(host.final_status(), Some(AppStatus::Finished));
    }
}
