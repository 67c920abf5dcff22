//! The attack orchestrator: source → queue → worker pool → optional sink.
//!
//! An attack runs on its own threads. A single *feeder* (the driver thread)
//! drains the source one block at a time into a [`BoundedQueue`]; `W`
//! *workers* pop blocks, call the [`Checker`] for every record, forward
//! derived records to the sink in worker-local batches, and keep a shared
//! tested-records counter current. The first worker to find a match wins;
//! the engine then shuts down cooperatively, drains and recycles any
//! leftover blocks, closes the files and invokes the completion callback.
//!
//! Within one block records are checked in source order by a single worker;
//! across blocks the workers race and no ordering is promised. Sink writes
//! from one worker keep that worker's order, but the interleaving across
//! workers is unspecified; the record-file format carries no global-order
//! dependence.
//!
//! # Example
//!
//! ```
//! use brute_io::attack::{Attack, Verdict};
//! use brute_io::source::BruteForceSource;
//!
//! let source = BruteForceSource::new(b"a", b"99", b"0123456789", 64).unwrap();
//! let attack = Attack::build(source)
//!     .workers(4)
//!     .start(|record: &[u8], _: Option<&mut [u8]>| {
//!         if record == &b"42\0"[..] {
//!             Verdict::Match
//!         } else {
//!             Verdict::NoMatch
//!         }
//!     })
//!     .unwrap();
//!
//! let status = attack.join();
//! assert_eq!(status.result.as_deref(), Some(&b"42\0"[..]));
//! assert!(status.error.is_none());
//! ```

extern crate crossbeam_utils;
extern crate scoped_threadpool;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crossbeam_utils::atomic::AtomicCell;

use crate::error::{Error, Fault, Stage};
use crate::queue::BoundedQueue;
use crate::sink::Sink;
use crate::source::Source;
use crate::MAX_THREADS;

/// Verdict returned by a [`Checker`] for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The record is the answer; the attack stops.
    Match,
    /// Tested and kept, but not the answer. Whatever the checker wrote into
    /// its derived-record slot is forwarded to the sink.
    NoMatch,
    /// Not a checkable record; neither counted nor forwarded.
    Skip,
}

/// Classifies candidate records.
///
/// Checkers are called concurrently from every worker and must not rely on
/// call order. Closures of the matching shape implement this trait.
pub trait Checker: Send + Sync {
    /// Checks one record. When a sink is configured, `derived` is the
    /// sink-record-sized slot the checker may fill with the record's derived
    /// artifact; it is forwarded unless the verdict is [`Verdict::Skip`].
    fn check(&self, record: &[u8], derived: Option<&mut [u8]>) -> Verdict;
}

impl<F> Checker for F
where
    F: Fn(&[u8], Option<&mut [u8]>) -> Verdict + Send + Sync,
{
    fn check(&self, record: &[u8], derived: Option<&mut [u8]>) -> Verdict {
        self(record, derived)
    }
}

/// Lifecycle of an [`Attack`]. Transitions are monotone:
/// `Active → Stopping → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackState {
    /// Feeder and workers are running.
    Active,
    /// Shutdown requested or under way.
    Stopping,
    /// All threads joined, files closed, callback invoked.
    Stopped,
}

/// Point-in-time copy of an attack's progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    /// Records checked so far. Skipped records are not counted.
    pub records_tested: u64,
    /// Exact record count of the input source, copied once at open time.
    pub total_records: u64,
    /// The matching record, padded to the input record size.
    pub result: Option<Vec<u8>>,
    /// The first failure recorded by the feeder or a worker, if any.
    #[serde(skip)]
    pub error: Option<Fault>,
}

struct Progress {
    records_tested: u64,
    total_records: u64,
    result: Option<Vec<u8>>,
    error: Option<Fault>,
}

/// State shared between the attack handle, the driver and the workers. The
/// state tag is read lock-free on fast paths; every mutation happens with
/// the progress mutex held.
struct Shared {
    state: AtomicCell<AttackState>,
    progress: Mutex<Progress>,
}

impl Shared {
    fn new() -> Shared {
        Shared {
            state: AtomicCell::new(AttackState::Active),
            progress: Mutex::new(Progress {
                records_tested: 0,
                total_records: 0,
                result: None,
                error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> AttackState {
        self.state.load()
    }

    fn request_stop(&self) {
        let _progress = self.lock();
        if self.state.load() != AttackState::Stopped {
            self.state.store(AttackState::Stopping);
        }
    }

    /// Installs the first fault; anything after it is dropped.
    fn set_error(&self, error: Error, stage: Stage) {
        let mut progress = self.lock();
        if progress.error.is_none() {
            progress.error = Some(Fault {
                error: Arc::new(error),
                stage,
            });
        }
    }

    fn set_total(&self, total: u64) {
        self.lock().total_records = total;
    }

    fn add_tested(&self, tested: u64) {
        self.lock().records_tested += tested;
    }

    fn has_result(&self) -> bool {
        self.lock().result.is_some()
    }

    /// Installs a matching record unless another worker got there first.
    fn offer_result(&self, record: Vec<u8>) {
        let mut progress = self.lock();
        if progress.result.is_none() {
            progress.result = Some(record);
        }
    }

    fn fill(&self, status: &mut Status) {
        let progress = self.lock();
        status.records_tested = progress.records_tested;
        status.total_records = progress.total_records;
        status.result = progress.result.clone();
        status.error = progress.error.clone();
    }

    fn snapshot(&self) -> Status {
        let mut status = Status::default();
        self.fill(&mut status);
        status
    }
}

type Callback = Box<dyn FnOnce(&Status) + Send>;

/// Configures an attack before it is started. Created by [`Attack::build`].
pub struct AttackBuilder<S: Source> {
    source: S,
    sink: Option<Box<dyn Sink>>,
    workers: usize,
    callback: Option<Callback>,
}

impl<S: Source + 'static> AttackBuilder<S> {
    /// Number of worker threads, clamped to `1..=MAX_THREADS`.
    pub fn workers(mut self, workers: usize) -> AttackBuilder<S> {
        self.workers = workers.clamp(1, MAX_THREADS);
        self
    }

    /// Captures checker-derived records into `sink`.
    pub fn sink<K: Sink + 'static>(mut self, sink: K) -> AttackBuilder<S> {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Invoked exactly once, after the workers have joined and the files are
    /// closed, with the final status. Runs whether the attack succeeded,
    /// failed or was stopped externally.
    pub fn on_complete<F>(mut self, callback: F) -> AttackBuilder<S>
    where
        F: FnOnce(&Status) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Spawns the driver thread and returns the running attack's handle.
    pub fn start<C: Checker + 'static>(self, checker: C) -> Result<Attack, Error> {
        let AttackBuilder {
            source,
            sink,
            workers,
            callback,
        } = self;
        let shared = Arc::new(Shared::new());
        let driver_shared = Arc::clone(&shared);
        let driver = thread::Builder::new()
            .name("brute_io-driver".into())
            .spawn(move || drive(source, sink, workers, checker, callback, driver_shared))?;
        Ok(Attack {
            shared,
            driver: Some(driver),
        })
    }
}

/// Handle to a running (or finished) attack.
///
/// Dropping the handle detaches the attack; it keeps running to completion
/// on its own threads.
pub struct Attack {
    shared: Arc<Shared>,
    driver: Option<thread::JoinHandle<()>>,
}

impl Attack {
    /// Starts configuring an attack over `source`. One worker and no sink
    /// unless said otherwise.
    pub fn build<S: Source + 'static>(source: S) -> AttackBuilder<S> {
        AttackBuilder {
            source,
            sink: None,
            workers: 1,
            callback: None,
        }
    }

    /// Copies the current counters, result and error into `status`.
    ///
    /// Returns [`Error::Stopped`] once the attack has fully stopped; the
    /// snapshot is still filled in that case, so a polling loop can read its
    /// final state from the last iteration.
    pub fn check(&self, status: &mut Status) -> Result<(), Error> {
        let stopped = self.shared.state() == AttackState::Stopped;
        self.shared.fill(status);
        if stopped {
            Err(Error::Stopped)
        } else {
            Ok(())
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AttackState {
        self.shared.state()
    }

    /// Requests a cooperative stop and returns immediately. Idempotent. The
    /// running threads observe the request at their next guarded state read,
    /// at worst one queue wait tick later; the completion callback still
    /// runs.
    pub fn stop(&self) {
        self.shared.request_stop();
    }

    /// Waits for the attack to finish and returns the final status.
    pub fn join(mut self) -> Status {
        if let Some(driver) = self.driver.take() {
            driver.join().expect("attack driver panicked");
        }
        self.shared.snapshot()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sizes the workers need before they first touch a block. Read once after
/// the files are open, so the input's record size is already settled.
struct WorkerLayout {
    record_size: usize,
    records_per_block: usize,
    sink_record_size: usize,
}

/// The driver: plays the feeder role and owns the worker pool.
fn drive<S, C>(
    source: S,
    sink: Option<Box<dyn Sink>>,
    workers: usize,
    checker: C,
    callback: Option<Callback>,
    shared: Arc<Shared>,
) where
    S: Source,
    C: Checker,
{
    let queue = BoundedQueue::new();
    let source = Mutex::new(source);
    let sink = sink.map(Mutex::new);

    // Open the input and copy its exact total out, all under one hold of the
    // source mutex.
    let mut input_open = false;
    match lock(&source).open() {
        Ok(total) => {
            input_open = true;
            shared.set_total(total);
        }
        Err(e) => {
            shared.set_error(e, Stage::Input);
            shared.request_stop();
        }
    }

    let mut output_open = false;
    if shared.state() == AttackState::Active {
        if let Some(sink) = sink.as_ref() {
            match lock(sink).open() {
                Ok(()) => output_open = true,
                Err(e) => {
                    shared.set_error(e, Stage::Output);
                    shared.request_stop();
                }
            }
        }
    }

    let layout = {
        let input = lock(&source);
        WorkerLayout {
            record_size: input.record_size(),
            records_per_block: input.records_per_block(),
            sink_record_size: sink.as_ref().map_or(0, |sink| lock(sink).record_size()),
        }
    };

    let mut pool = scoped_threadpool::Pool::new(workers as u32);
    pool.scoped(|scope| {
        for _ in 0..workers {
            scope.execute(|| worker(&queue, &source, sink.as_ref(), &checker, &shared, &layout));
        }

        // Feeder: drain the source into the queue until stopped, exhausted
        // or failed.
        while shared.state() == AttackState::Active {
            let block = match lock(&source).next_block() {
                Ok(Some(block)) => block,
                Ok(None) => break,
                Err(e) => {
                    shared.set_error(e, Stage::Input);
                    break;
                }
            };
            if let Err(block) = queue.push_wait(block) {
                // the queue left its active state while we waited
                lock(&source).free_block(block);
                break;
            }
        }

        shared.request_stop();
        queue.stop();

        // With a result in hand nobody needs the remaining blocks.
        if shared.has_result() {
            while let Some(block) = queue.try_pop() {
                lock(&source).free_block(block);
            }
        }

        // leaving the scope joins the workers
    });

    // Second-chance drain: blocks the workers never popped.
    while let Some(block) = queue.try_pop() {
        lock(&source).free_block(block);
    }
    drop(queue);

    if input_open {
        if let Err(e) = lock(&source).close() {
            shared.set_error(e, Stage::Input);
        }
    }
    if output_open {
        if let Some(sink) = sink.as_ref() {
            if let Err(e) = lock(sink).close() {
                shared.set_error(e, Stage::Output);
            }
        }
    }

    let status = shared.snapshot();
    if let Some(callback) = callback {
        callback(&status);
    }
    shared.state.store(AttackState::Stopped);
}

/// One worker: pops blocks, checks records, stages sink output and offers a
/// found result.
fn worker<S, C>(
    queue: &BoundedQueue,
    source: &Mutex<S>,
    sink: Option<&Mutex<Box<dyn Sink>>>,
    checker: &C,
    shared: &Shared,
    layout: &WorkerLayout,
) where
    S: Source,
    C: Checker,
{
    let record_size = layout.record_size;
    let slot = layout.sink_record_size;
    let mut staging = vec![0u8; slot * layout.records_per_block];
    let mut staged = 0;
    let mut result: Option<Vec<u8>> = None;
    let mut failed = false;

    while let Some(block) = queue.pop_wait() {
        let mut tested = 0u64;

        for record in block.records(record_size) {
            let verdict = match sink {
                Some(_) => checker.check(record, Some(&mut staging[staged..staged + slot])),
                None => checker.check(record, None),
            };
            if verdict == Verdict::Skip {
                continue;
            }
            tested += 1;

            if let Some(sink) = sink {
                staged += slot;
                if staged == staging.len() {
                    if let Err(e) = lock(sink).write_block(&staging) {
                        shared.set_error(e, Stage::Output);
                        queue.stop();
                        failed = true;
                        break;
                    }
                    staging.fill(0);
                    staged = 0;
                }
            }

            if verdict == Verdict::Match {
                result = Some(record.to_vec());
                break;
            }
        }

        shared.add_tested(tested);
        lock(source).free_block(block);

        if failed || result.is_some() {
            break;
        }
    }

    // Flush whatever is still staged.
    if staged > 0 {
        if let Some(sink) = sink {
            if let Err(e) = lock(sink).write_block(&staging[..staged]) {
                shared.set_error(e, Stage::Output);
                queue.stop();
            }
        }
    }

    if let Some(record) = result {
        shared.offer_result(record);
        queue.stop();
    }
}
