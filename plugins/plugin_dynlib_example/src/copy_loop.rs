use std::time::Instant;

use liblogger_macros::measure_time;
use plugin_core::{AppError, AppHost};

use crate::stats::TransferStats;

/// Allocates the read/write buffer without aborting on failure.
pub fn allocate_buffer(bufsize: usize) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bufsize)
        .map_err(|source| AppError::Allocation { requested: bufsize, source })?;
    buf.resize(bufsize, 0);
    Ok(buf)
}

/// Writes `chunk` to every output in order. Any output that takes less than
/// the whole chunk fails the copy.
pub fn write_to_outputs(host: &mut dyn AppHost, chunk: &[u8]) -> Result<(), AppError> {
    for output in 0..host.n_outputs() {
        let written = host.write(output, chunk)?;
        if written != chunk.len() {
            return Err(AppError::ShortWrite {
                output,
                expected: chunk.len(),
                written,
            });
        }
    }
    Ok(())
}

/// Copies input 0 to every output, `bufsize` bytes at a time, until a read
/// returns nothing.
#[measure_time]
pub fn copy_stream(host: &mut dyn AppHost, bufsize: usize) -> Result<TransferStats, AppError> {
    if host.n_inputs() == 0 {
        return Err(AppError::MissingInput);
    }
    let mut buf = allocate_buffer(bufsize)?;
    let mut stats = TransferStats::default();

    loop {
        let start = Instant::now();
        let n_read = host.read(0, &mut buf)?;
        stats.record_read(start.elapsed());
        if n_read == 0 {
            break;
        }

        let start = Instant::now();
        write_to_outputs(host, &buf[..n_read])?;
        stats.record_write(n_read, start.elapsed());
    }

    Ok(stats)
}
