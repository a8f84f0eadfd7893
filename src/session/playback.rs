use std::collections::HashSet;

use tracing::{debug, warn};

use crate::audio::{DeviceError, OutputSink};

/// Schedules streamed audio chunks for gapless sequential playback
///
/// Owns the "next available start time" cursor and the set of live scheduled
/// entries. Exactly two entry points touch the cursor: [`schedule`] advances
/// it, [`flush`] resets it to zero.
///
/// [`schedule`]: PlaybackScheduler::schedule
/// [`flush`]: PlaybackScheduler::flush
pub struct PlaybackScheduler {
    sink: Box<dyn OutputSink>,
    sample_rate: u32,
    cursor: f64,
    live: HashSet<u64>,
    next_id: u64,
}

impl PlaybackScheduler {
    pub fn new(sink: Box<dyn OutputSink>, sample_rate: u32) -> Self {
        Self {
            sink,
            sample_rate,
            cursor: 0.0,
            live: HashSet::new(),
            next_id: 0,
        }
    }

    /// Schedule one decoded chunk
    ///
    /// The start time is the later of the cursor and the device clock, so
    /// chunks never overlap and a starved device resumes immediately rather
    /// than padding silence. The cursor then advances by the chunk duration.
    pub fn schedule(&mut self, samples: Vec<f32>) -> Result<u64, DeviceError> {
        let duration = samples.len() as f64 / self.sample_rate as f64;
        let start = self.cursor.max(self.sink.now());

        let id = self.next_id;
        self.next_id += 1;

        self.sink.play(id, samples, start)?;
        self.cursor = start + duration;
        self.live.insert(id);

        debug!(
            "Scheduled chunk {} at {:.3}s ({:.3}s long, cursor now {:.3}s)",
            id, start, duration, self.cursor
        );

        Ok(id)
    }

    /// Remove entries whose playback ended naturally
    pub fn reap_finished(&mut self) {
        for id in self.sink.finished() {
            self.live.remove(&id);
        }
    }

    /// Hard barrier: stop every live entry, clear the set, reset the cursor
    ///
    /// Used for the remote "interrupted" signal and for teardown; queued
    /// but unplayed audio is discarded, never drained.
    pub fn flush(&mut self) {
        let discarded = self.live.len();
        for id in self.live.drain() {
            self.sink.stop(id);
        }
        self.cursor = 0.0;
        if discarded > 0 {
            debug!("Flushed {} scheduled playback entries", discarded);
        }
    }

    /// Flush and close the underlying sink, awaiting its release
    pub async fn close(&mut self) {
        self.flush();
        if let Err(e) = self.sink.close().await {
            warn!("Failed to close playback sink: {}", e);
        }
    }

    /// Number of scheduled-but-not-finished entries
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Next available playback start time on the device clock
    pub fn cursor(&self) -> f64 {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeSinkState {
        now: f64,
        plays: Vec<(u64, usize, f64)>,
        stopped: Vec<u64>,
        finished: Vec<u64>,
    }

    #[derive(Clone, Default)]
    struct FakeSink(Arc<Mutex<FakeSinkState>>);

    #[async_trait::async_trait]
    impl OutputSink for FakeSink {
        fn now(&self) -> f64 {
            self.0.lock().unwrap().now
        }

        fn play(&mut self, id: u64, samples: Vec<f32>, start: f64) -> Result<(), DeviceError> {
            self.0.lock().unwrap().plays.push((id, samples.len(), start));
            Ok(())
        }

        fn stop(&mut self, id: u64) {
            self.0.lock().unwrap().stopped.push(id);
        }

        fn finished(&mut self) -> Vec<u64> {
            std::mem::take(&mut self.0.lock().unwrap().finished)
        }

        async fn close(&mut self) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    fn scheduler_with_sink() -> (PlaybackScheduler, FakeSink) {
        let sink = FakeSink::default();
        let scheduler = PlaybackScheduler::new(Box::new(sink.clone()), 24000);
        (scheduler, sink)
    }

    #[test]
    fn chunks_schedule_back_to_back() {
        let (mut scheduler, sink) = scheduler_with_sink();
        sink.0.lock().unwrap().now = 1.0;

        // 24000 samples = 1s, 12000 samples = 0.5s
        scheduler.schedule(vec![0.0; 24000]).unwrap();
        scheduler.schedule(vec![0.0; 12000]).unwrap();

        let plays = sink.0.lock().unwrap().plays.clone();
        assert_eq!(plays[0].2, 1.0, "first chunk starts at the device clock");
        assert_eq!(plays[1].2, 2.0, "second chunk starts right after the first");
        assert_eq!(scheduler.cursor(), 2.5);
    }

    #[test]
    fn starved_device_resumes_immediately() {
        let (mut scheduler, sink) = scheduler_with_sink();

        scheduler.schedule(vec![0.0; 2400]).unwrap(); // cursor 0.1
        sink.0.lock().unwrap().now = 5.0; // clock ran past the cursor
        scheduler.schedule(vec![0.0; 2400]).unwrap();

        let plays = sink.0.lock().unwrap().plays.clone();
        assert_eq!(plays[1].2, 5.0, "no gap-filling silence before the chunk");
        assert!((scheduler.cursor() - 5.1).abs() < 1e-9);
    }

    #[test]
    fn flush_stops_everything_and_resets_cursor() {
        let (mut scheduler, sink) = scheduler_with_sink();

        scheduler.schedule(vec![0.0; 2400]).unwrap();
        scheduler.schedule(vec![0.0; 2400]).unwrap();
        scheduler.schedule(vec![0.0; 2400]).unwrap();
        assert_eq!(scheduler.live_count(), 3);

        scheduler.flush();

        assert_eq!(scheduler.live_count(), 0);
        assert_eq!(scheduler.cursor(), 0.0);
        assert_eq!(sink.0.lock().unwrap().stopped.len(), 3);
    }

    #[test]
    fn natural_completion_is_reaped() {
        let (mut scheduler, sink) = scheduler_with_sink();

        let id = scheduler.schedule(vec![0.0; 2400]).unwrap();
        sink.0.lock().unwrap().finished.push(id);
        scheduler.reap_finished();

        assert_eq!(scheduler.live_count(), 0);
        assert!(
            sink.0.lock().unwrap().stopped.is_empty(),
            "a finished entry is not force-stopped"
        );
    }
}
