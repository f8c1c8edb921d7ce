use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;

use engine_core::{AppBinding, HostError, NativeApp};
use plugin_core::{AppError, AppParams, AppStatus, LocalHost};

fn copy_app() -> NativeApp {
    NativeApp::new(AppBinding::from_entry_points(
        "plugin_dynlib_example",
        plugin_dynlib_example::init,
        plugin_dynlib_example::run,
        Some(plugin_dynlib_example::data_written),
        Some(plugin_dynlib_example::drop_completed),
    ))
}

#[derive(Clone, Default)]
struct Sink {
    writes: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl Sink {
    fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.borrow().clone()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.borrow_mut().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Counts reads so tests can tell whether the app touched its input
struct CountingInput<'a> {
    data: &'a [u8],
    reads: Rc<RefCell<usize>>,
}

impl Read for CountingInput<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        *self.reads.borrow_mut() += 1;
        self.data.read(buf)
    }
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hands out one chunk, then fails
struct FlakyInput {
    served: bool,
}

impl Read for FlakyInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "upstream gone"));
        }
        self.served = true;
        let n = buf.len().min(4);
        buf[..n].copy_from_slice(&b"ABCD"[..n]);
        Ok(n)
    }
}

#[test]
fn copies_abcdefgh_through_the_c_abi() {
    let first = Sink::default();
    let second = Sink::default();
    let reads = Rc::new(RefCell::new(0));
    let params = AppParams::new().with("bufsize", "4");

    let (running, statuses) = {
        let mut host = LocalHost::new()
            .with_input(CountingInput { data: b"ABCDEFGH", reads: reads.clone() })
            .with_output(first.clone())
            .with_output(second.clone());
        copy_app().execute(&params, &mut host).unwrap();
        (host.running_calls(), host.statuses().to_vec())
    };

    for sink in [&first, &second] {
        assert_eq!(sink.writes(), vec![b"ABCD".to_vec(), b"EFGH".to_vec()]);
    }
    // two full chunks and the terminating empty read
    assert_eq!(*reads.borrow(), 3);
    assert_eq!(running, 1);
    assert_eq!(statuses, vec![AppStatus::Finished]);
}

#[test]
fn unsatisfiable_buffer_fails_run_without_io() {
    let sink = Sink::default();
    let reads = Rc::new(RefCell::new(0));
    let params = AppParams::new().with("bufsize", usize::MAX.to_string());

    let (result, statuses) = {
        let mut host = LocalHost::new()
            .with_input(CountingInput { data: b"ABCDEFGH", reads: reads.clone() })
            .with_output(sink.clone());
        let result = copy_app().execute(&params, &mut host);
        (result, host.statuses().to_vec())
    };

    assert!(matches!(result, Err(HostError::Run(status)) if status != 0));
    assert_eq!(*reads.borrow(), 0);
    assert!(sink.writes().is_empty());
    assert_eq!(statuses, vec![AppStatus::Error]);
}

#[test]
fn failing_output_surfaces_the_io_error() {
    let params = AppParams::new().with("bufsize", "4");
    let mut host = LocalHost::new().with_input(&b"ABCDEFGH"[..]).with_output(Broken);

    let result = copy_app().execute(&params, &mut host);

    assert!(matches!(result, Err(HostError::App(AppError::Write { output: 0, .. }))));
    assert_eq!(host.final_status(), Some(AppStatus::Error));
}

#[test]
fn streams_chunks_to_every_output() {
    let first = Sink::default();
    let second = Sink::default();
    let params = AppParams::new().with("print_stats", "1");

    let statuses = {
        let mut host = LocalHost::new()
            .with_output(first.clone())
            .with_output(second.clone());
        copy_app()
            .stream(&params, &mut host, "upstream", [&b"hello "[..], &b"world"[..]])
            .unwrap();
        host.statuses().to_vec()
    };

    assert_eq!(first.writes(), vec![b"hello ".to_vec(), b"world".to_vec()]);
    assert_eq!(second.writes().concat(), b"hello world");
    assert_eq!(statuses, vec![AppStatus::Finished]);
}

#[test]
fn streaming_needs_notification_entry_points() {
    let app = NativeApp::new(AppBinding::from_entry_points(
        "run-only",
        plugin_dynlib_example::init,
        plugin_dynlib_example::run,
        None,
        None,
    ));
    assert!(!app.binding().supports_streaming());

    let mut host = LocalHost::new().with_output(io::sink());
    let result = app.stream(&AppParams::new(), &mut host, "in", Vec::<Vec<u8>>::new());

    assert!(matches!(result, Err(HostError::MissingSymbol { symbol: "data_written", .. })));
    assert!(host.statuses().is_empty());
}

#[test]
fn failing_input_is_not_reported_as_finished() {
    let sink = Sink::default();
    let params = AppParams::new().with("bufsize", "4");

    let (result, statuses) = {
        let mut host = LocalHost::new()
            .with_input(FlakyInput { served: false })
            .with_output(sink.clone());
        let result = copy_app().execute(&params, &mut host);
        (result, host.statuses().to_vec())
    };

    assert!(matches!(result, Err(HostError::App(AppError::Read { input: 0, .. }))));
    assert_eq!(statuses, vec![AppStatus::Error]);
    assert_eq!(sink.writes(), vec![b"ABCD".to_vec()]);
}
