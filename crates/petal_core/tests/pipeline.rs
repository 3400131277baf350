use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use petal_core::{
    Batch, ContextId, Error, HostError, Instruction, Op, Pipeline, PipelineConfig, RasterHost,
    STRIDE,
};

#[derive(Clone, Debug, PartialEq)]
struct Seen {
    op: u8,
    ctx: u16,
    payload: [f32; 6],
    text: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Mode {
    Ok,
    Fail,
    Panic,
}

#[derive(Default)]
struct Log {
    batches: Vec<Vec<Seen>>,
    strides: Vec<usize>,
    created: Vec<u16>,
    destroyed: Vec<u16>,
}

/// Test host: decodes every record and keeps one entry per submit call
struct TestHost {
    log: Arc<Mutex<Log>>,
    mode: Mode,
}

impl TestHost {
    fn new(mode: Mode) -> (Self, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        (
            Self {
                log: log.clone(),
                mode,
            },
            log,
        )
    }
}

impl RasterHost for TestHost {
    fn submit(&mut self, mut batch: Batch<'_>) -> Result<(), HostError> {
        let mut seen = Vec::new();
        for record in batch.records() {
            let text = record
                .text()
                .and_then(|h| batch.take_text(h))
                .map(|s| s.into_string().unwrap());
            if self.mode == Mode::Panic && text.is_some() {
                panic!("host blew up while drawing text");
            }
            seen.push(Seen {
                op: record.raw_op(),
                ctx: record.context().get(),
                payload: *record.payload(),
                text,
            });
        }
        let mut log = self.log.lock();
        log.strides.push(batch.stride());
        log.batches.push(seen);
        match self.mode {
            Mode::Fail => Err(HostError::Unavailable("canvas detached".into())),
            _ => Ok(()),
        }
    }

    fn create_surface(&mut self, id: ContextId, _width: f32, _height: f32) {
        self.log.lock().created.push(id.get());
    }

    fn resize_surface(&mut self, _id: ContextId, _width: f32, _height: f32) {}

    fn destroy_surface(&mut self, id: ContextId) {
        self.log.lock().destroyed.push(id.get());
    }
}

fn pipeline(capacity: usize, mode: Mode) -> (Pipeline, Arc<Mutex<Log>>) {
    let (host, log) = TestHost::new(mode);
    let config = PipelineConfig::default().with_tape_capacity(capacity);
    (Pipeline::new(config, host).unwrap(), log)
}

fn fill_rect(ctx: u16, i: usize) -> Instruction {
    Instruction::with_payload(
        Op::FillRect,
        ContextId::new(ctx),
        &[i as f32, 0.0, 10.0, 10.0],
    )
}

#[test]
fn implicit_flush_count_matches_capacity() {
    for capacity in [1usize, 2, 3, 7, 16] {
        for n in 1usize..=50 {
            let (pipeline, log) = pipeline(capacity, Mode::Ok);
            for i in 0..n {
                pipeline.append(fill_rect(0, i));
            }

            let expected = (n - 1) / capacity;
            let log = log.lock();
            assert_eq!(log.batches.len(), expected, "n={n} capacity={capacity}");
            assert_eq!(pipeline.rollovers(), expected as u64);
            assert_eq!(pipeline.pending(), n - expected * capacity);

            // Every implicit flush submitted a full tape, and the record that
            // triggered it became index 0 of the next tape.
            for (k, batch) in log.batches.iter().enumerate() {
                assert_eq!(batch.len(), capacity);
                assert_eq!(batch[0].payload[0], (k * capacity) as f32);
            }
            if expected > 0 {
                assert_eq!(
                    pipeline.pending_records()[0].payload()[0],
                    (expected * capacity) as f32
                );
            }
        }
    }
}

#[test]
fn three_fill_rects_replay_in_order() {
    let (pipeline, log) = pipeline(16384, Mode::Ok);
    pipeline.append(fill_rect(0, 0));
    pipeline.append(fill_rect(2, 1));
    pipeline.append(fill_rect(1, 2));
    assert!(log.lock().batches.is_empty());
    assert_eq!(pipeline.pending(), 3);

    pipeline.flush();

    let log = log.lock();
    assert_eq!(log.batches.len(), 1);
    assert_eq!(log.strides, vec![STRIDE]);
    let batch = &log.batches[0];
    assert_eq!(batch.len(), 3);
    assert_eq!(
        batch.iter().map(|s| s.ctx).collect::<Vec<_>>(),
        vec![0, 2, 1]
    );
    assert_eq!(
        batch.iter().map(|s| s.payload[0]).collect::<Vec<_>>(),
        vec![0.0, 1.0, 2.0]
    );
    assert!(batch.iter().all(|s| s.op == Op::FillRect as u8));
    assert_eq!(pipeline.pending(), 0);
}

#[test]
fn flushing_empty_tape_is_noop() {
    let (pipeline, log) = pipeline(8, Mode::Fail);
    pipeline.flush();
    assert!(pipeline.try_flush().is_ok());
    assert_eq!(pipeline.rollovers(), 0);
    assert!(log.lock().batches.is_empty());
}

#[test]
fn text_buffers_transfer_to_host() {
    let (pipeline, log) = pipeline(64, Mode::Ok);
    assert!(pipeline.append_text(Op::FillText, ContextId::PRIMARY, "héllo"));
    assert!(pipeline.append_text(Op::StrokeText, ContextId::new(4), "world"));
    assert_eq!(pipeline.pending_texts(), 2);

    pipeline.flush();

    assert_eq!(pipeline.pending_texts(), 0);
    let log = log.lock();
    let texts: Vec<_> = log.batches[0].iter().map(|s| s.text.clone()).collect();
    assert_eq!(
        texts,
        vec![Some("héllo".to_string()), Some("world".to_string())]
    );
    assert_eq!(log.batches[0][1].op, Op::StrokeText as u8);
    assert_eq!(log.batches[0][1].payload, [0.0; 6]);
}

#[test]
fn text_with_interior_nul_is_dropped() {
    let (pipeline, _log) = pipeline(64, Mode::Ok);
    assert!(!pipeline.append_text(Op::FillText, ContextId::PRIMARY, "bad\0text"));
    assert_eq!(pipeline.pending(), 0);
    assert_eq!(pipeline.pending_texts(), 0);
}

#[test]
fn text_on_full_tape_survives_implicit_flush() {
    let (pipeline, log) = pipeline(2, Mode::Ok);
    pipeline.append(fill_rect(0, 0));
    pipeline.append(fill_rect(0, 1));
    assert!(pipeline.append_text(Op::FillText, ContextId::PRIMARY, "after"));

    assert_eq!(log.lock().batches.len(), 1);
    assert_eq!(pipeline.pending(), 1);
    assert_eq!(pipeline.pending_texts(), 1);

    pipeline.flush();
    let log = log.lock();
    assert_eq!(log.batches[1][0].text.as_deref(), Some("after"));
}

#[test]
fn try_flush_reports_host_failure() {
    let (pipeline, log) = pipeline(8, Mode::Fail);
    pipeline.append(fill_rect(0, 0));
    pipeline.append_text(Op::FillText, ContextId::PRIMARY, "lost");

    let err = pipeline.try_flush().unwrap_err();
    assert!(matches!(err, Error::Host(HostError::Unavailable(_))));

    // The batch is gone, not kept for a retry
    assert_eq!(pipeline.pending(), 0);
    assert_eq!(pipeline.pending_texts(), 0);
    assert_eq!(log.lock().batches.len(), 1);
}

#[test]
#[should_panic(expected = "raster host failed")]
fn flush_with_failing_host_is_fatal() {
    let (pipeline, _log) = pipeline(8, Mode::Fail);
    pipeline.append(fill_rect(0, 0));
    pipeline.flush();
}

#[test]
#[should_panic(expected = "raster host failed")]
fn implicit_flush_with_failing_host_is_fatal() {
    let (pipeline, _log) = pipeline(1, Mode::Fail);
    pipeline.append(fill_rect(0, 0));
    pipeline.append(fill_rect(0, 1));
}

#[test]
fn host_panic_releases_texts_and_resets_tape() {
    let (pipeline, _log) = pipeline(8, Mode::Panic);
    pipeline.append(fill_rect(0, 0));
    pipeline.append_text(Op::FillText, ContextId::PRIMARY, "first");
    pipeline.append_text(Op::FillText, ContextId::PRIMARY, "second");

    let result = panic::catch_unwind(AssertUnwindSafe(|| pipeline.flush()));
    assert!(result.is_err());

    assert_eq!(pipeline.pending(), 0);
    assert_eq!(pipeline.pending_texts(), 0);
    assert_eq!(pipeline.rollovers(), 1);
}

#[test]
fn context_lease_and_release_drive_host_surfaces() {
    let (pipeline, log) = pipeline(8, Mode::Ok);
    let a = pipeline.lease_context().unwrap();
    let b = pipeline.lease_context().unwrap();
    assert_eq!((a.get(), b.get()), (1, 2));

    pipeline.release_context(a).unwrap();
    assert_eq!(pipeline.lease_context().unwrap(), a);

    assert!(matches!(
        pipeline.release_context(ContextId::PRIMARY),
        Err(Error::PrimaryContextRelease)
    ));

    let log = log.lock();
    assert_eq!(log.created, vec![1, 2, 1]);
    assert_eq!(log.destroyed, vec![1]);
}

#[test]
fn release_with_pending_records_waits_for_flush() {
    let (pipeline, log) = pipeline(8, Mode::Ok);
    let a = pipeline.lease_context().unwrap();
    pipeline.append(fill_rect(a.get(), 0));
    pipeline.release_context(a).unwrap();

    assert!(!pipeline.is_leased(a));
    assert_eq!(pipeline.pending_releases(), 1);
    assert!(log.lock().destroyed.is_empty());
    // The id stays reserved until its records have been submitted
    let b = pipeline.lease_context().unwrap();
    assert_ne!(b, a);

    pipeline.flush();
    {
        let log = log.lock();
        assert_eq!(log.batches.len(), 1);
        assert_eq!(log.batches[0][0].ctx, a.get());
        assert_eq!(log.destroyed, vec![a.get()]);
    }
    assert_eq!(pipeline.pending_releases(), 0);
    assert_eq!(pipeline.lease_context().unwrap(), a);
}

#[test]
fn failed_flush_still_destroys_released_surfaces() {
    let (pipeline, log) = pipeline(8, Mode::Fail);
    let a = pipeline.lease_context().unwrap();
    pipeline.append(fill_rect(a.get(), 0));
    pipeline.release_context(a).unwrap();

    assert!(pipeline.try_flush().is_err());
    assert_eq!(log.lock().destroyed, vec![a.get()]);
    assert_eq!(pipeline.pending_releases(), 0);
}

#[test]
fn primary_claim_is_exclusive() {
    let (pipeline, _log) = pipeline(8, Mode::Ok);
    pipeline.claim_primary().unwrap();
    assert!(matches!(pipeline.claim_primary(), Err(Error::PrimaryInUse)));
    pipeline.unclaim_primary();
    assert!(pipeline.claim_primary().is_ok());
}

#[test]
fn invalid_config_is_rejected() {
    let (host, _log) = TestHost::new(Mode::Ok);
    let config = PipelineConfig::default().with_tape_capacity(0);
    assert!(matches!(Pipeline::new(config, host), Err(Error::Config(_))));
}

#[test]
fn pipeline_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Pipeline>();

    let (pipeline, log) = pipeline(1024, Mode::Ok);
    std::thread::scope(|s| {
        for t in 0..4u16 {
            let pipeline = &pipeline;
            s.spawn(move || {
                for i in 0..100 {
                    pipeline.append(fill_rect(t, i));
                }
            });
        }
    });
    pipeline.flush();

    let log = log.lock();
    let batch = &log.batches[0];
    assert_eq!(batch.len(), 400);
    // Each thread's records stay in its own append order
    for t in 0..4u16 {
        let xs: Vec<f32> = batch
            .iter()
            .filter(|s| s.ctx == t)
            .map(|s| s.payload[0])
            .collect();
        assert_eq!(xs, (0..100).map(|i| i as f32).collect::<Vec<_>>());
    }
}
