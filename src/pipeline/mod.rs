//! Streaming segmentation of whole volumes.
//!
//! A [`Pipeline`] connects a [`VoxelSource`] to a [`VoxelSink`] through a
//! fixed pool of worker threads:
//!
//! ```text
//! source ──(work queue)──► workers: sample + segment ──(output queue)──► sink
//! ```
//!
//! Both queues are bounded, so the producer blocks once workers fall behind
//! and memory stays proportional to `queue_depth`. Results reach the sink in
//! completion order, not traversal order; every produced voxel is delivered
//! exactly once. The first error from any stage cancels the run: the producer
//! stops reading, workers drop their queued work, and `run` returns that
//! error. Collections already accepted by the sink stay delivered.

mod options;
mod sink;
mod volume;

pub use options::PipelineOptions;
pub use sink::CollectingSink;
pub use volume::{CoefficientVolume, VolumeSource};

use crate::diagnostics::PipelineReport;
use crate::error::{Result, SegmentError};
use crate::lobe::{LobeCollection, VoxelCoord};
use crate::segmenter::Segmenter;
use crate::sh::AmplitudeSampler;
use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;
use nalgebra::DVector;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

/// Coefficient vector of one voxel.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelCoefficients {
    pub vox: VoxelCoord,
    pub coefficients: Vec<f32>,
}

/// Lazy, single-pass sequence of voxels in a fixed traversal order.
pub trait VoxelSource {
    /// Length of every coefficient vector this source yields.
    fn coefficient_count(&self) -> usize;

    /// Next voxel, or `None` once the source is exhausted.
    fn next_voxel(&mut self) -> Result<Option<VoxelCoefficients>>;
}

/// Consumer of per-voxel results. Called from a single thread.
pub trait VoxelSink {
    fn accept(&mut self, lobes: LobeCollection) -> Result<()>;
}

/// Bounded producer/worker/consumer runner.
#[derive(Debug)]
pub struct Pipeline<'a> {
    sampler: &'a AmplitudeSampler,
    segmenter: &'a Segmenter<'a>,
    options: PipelineOptions,
}

/// First error wins; any recorded error cancels every stage.
#[derive(Default)]
struct Failure {
    cancelled: AtomicBool,
    first: Mutex<Option<SegmentError>>,
}

impl Failure {
    fn record(&self, err: SegmentError) {
        if let Ok(mut slot) = self.first.lock() {
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn into_error(self) -> Option<SegmentError> {
        self.first.into_inner().ok().flatten()
    }
}

impl<'a> Pipeline<'a> {
    /// The sampler's output must match the segmenter's catalogue.
    pub fn new(
        sampler: &'a AmplitudeSampler,
        segmenter: &'a Segmenter<'a>,
        options: PipelineOptions,
    ) -> Result<Self> {
        let directions = segmenter.directions().len();
        if sampler.direction_count() != directions {
            return Err(SegmentError::InputShape {
                expected: directions,
                found: sampler.direction_count(),
            });
        }
        Ok(Self {
            sampler,
            segmenter,
            options,
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Stream every voxel of `source` through the worker pool into `sink`.
    ///
    /// The source's coefficient count is checked before any voxel is read.
    pub fn run<S, K>(&self, source: S, sink: &mut K) -> Result<PipelineReport>
    where
        S: VoxelSource + Send,
        K: VoxelSink + ?Sized,
    {
        self.sampler.check_len(source.coefficient_count())?;

        let start = Instant::now();
        let workers = self.options.workers.max(1);
        let depth = self.options.queue_depth.max(1);
        debug!("segmenting with {workers} workers, queue depth {depth}");

        let (work_tx, work_rx) = bounded::<VoxelCoefficients>(depth);
        let (out_tx, out_rx) = bounded::<LobeCollection>(depth);
        let failure = Failure::default();
        let mut segmented = 0usize;
        let mut lobes_emitted = 0usize;

        let voxels_read = thread::scope(|scope| {
            let failure = &failure;
            let producer = scope.spawn(move || {
                guarded("producer", failure, || produce(source, work_tx, failure)).unwrap_or(0)
            });
            let pool: Vec<_> = (0..workers)
                .map(|_| {
                    let rx = work_rx.clone();
                    let tx = out_tx.clone();
                    scope.spawn(move || {
                        guarded("worker", failure, || self.work(rx, tx, failure));
                    })
                })
                .collect();
            drop(work_rx);
            drop(out_tx);

            for lobes in out_rx.iter() {
                if failure.is_cancelled() {
                    break;
                }
                let count = lobes.len();
                if let Err(err) = sink.accept(lobes) {
                    failure.record(err);
                    break;
                }
                segmented += 1;
                lobes_emitted += count;
            }
            drop(out_rx);

            for handle in pool {
                if let Err(payload) = handle.join() {
                    failure.record(panic_error("worker", payload));
                }
            }
            match producer.join() {
                Ok(read) => read,
                Err(payload) => {
                    failure.record(panic_error("producer", payload));
                    0
                }
            }
        });

        if let Some(err) = failure.into_error() {
            debug!("pipeline cancelled after {segmented} voxels: {err}");
            return Err(err);
        }
        let report = PipelineReport {
            voxels_read,
            voxels_segmented: segmented,
            lobes_emitted,
            workers,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        debug!(
            "segmented {} voxels into {} lobes in {:.1} ms",
            report.voxels_segmented, report.lobes_emitted, report.elapsed_ms
        );
        Ok(report)
    }

    fn work(
        &self,
        rx: Receiver<VoxelCoefficients>,
        tx: Sender<LobeCollection>,
        failure: &Failure,
    ) {
        let mut amplitudes = DVector::zeros(self.sampler.direction_count());
        for item in rx.iter() {
            if failure.is_cancelled() {
                break;
            }
            let result = self
                .sampler
                .sample_into(&item.coefficients, &mut amplitudes)
                .and_then(|()| self.segmenter.segment(amplitudes.as_slice(), item.vox));
            match result {
                Ok(lobes) => {
                    if tx.send(lobes).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    failure.record(err);
                    break;
                }
            }
        }
    }
}

/// Drain `source` into the work queue; returns the number of voxels read.
fn produce<S: VoxelSource>(mut source: S, tx: Sender<VoxelCoefficients>, failure: &Failure) -> usize {
    let mut read = 0usize;
    while !failure.is_cancelled() {
        match source.next_voxel() {
            Ok(Some(item)) => {
                read += 1;
                if tx.send(item).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                failure.record(err);
                break;
            }
        }
    }
    read
}

/// Run one stage, turning a panic into a recorded failure so the other
/// stages stop right away.
fn guarded<T>(stage: &'static str, failure: &Failure, body: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => Some(value),
        Err(payload) => {
            failure.record(panic_error(stage, payload));
            None
        }
    }
}

fn panic_error(stage: &'static str, payload: Box<dyn Any + Send>) -> SegmentError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "thread panicked".to_string());
    SegmentError::Stage { stage, message }
}
