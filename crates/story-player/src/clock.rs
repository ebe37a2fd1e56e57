//! Normalized 0→1 progress clock driven by host timestamps.
//!
//! Each `start`/`pause`/`resume`/`reset` bumps the clock generation. A run
//! that reaches 1 yields a [`ClockCompletion`] stamped with the generation it
//! belonged to; completions from superseded runs fail [`ProgressClock::acknowledge`].

/// Completion signal for a single clock run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockCompletion {
    pub generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct ClockRun {
    /// Value the run started from (0 for `start`, frozen value for `resume`).
    from: f64,
    started_at_ms: u64,
    duration_ms: u64,
}

impl ClockRun {
    fn deadline_ms(&self) -> u64 {
        self.started_at_ms.saturating_add(self.duration_ms)
    }

    fn value_at(&self, now_ms: u64) -> f64 {
        if now_ms >= self.deadline_ms() {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms) as f64;
        let frac = elapsed / self.duration_ms as f64;
        (self.from + (1.0 - self.from) * frac).clamp(0.0, 1.0)
    }
}

#[derive(Debug)]
pub struct ProgressClock {
    value: f64,
    run: Option<ClockRun>,
    generation: u64,
    acknowledged: bool,
}

impl Default for ProgressClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressClock {
    pub fn new() -> Self {
        Self {
            value: 0.0,
            run: None,
            generation: 0,
            acknowledged: false,
        }
    }

    /// Begin a fresh run from 0. Any in-flight run is cancelled first.
    pub fn start(&mut self, duration_ms: u64, now_ms: u64) -> u64 {
        self.value = 0.0;
        self.begin(duration_ms, now_ms)
    }

    /// Freeze the current value. No-op (returns false) when nothing is running.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        let Some(run) = self.run.take() else {
            return false;
        };
        self.value = run.value_at(now_ms);
        self.generation += 1;
        true
    }

    /// Continue from the frozen value toward 1 over exactly `remaining_ms`.
    pub fn resume(&mut self, remaining_ms: u64, now_ms: u64) -> u64 {
        if let Some(run) = self.run.take() {
            self.value = run.value_at(now_ms);
        }
        self.begin(remaining_ms, now_ms)
    }

    /// Back to 0 with no run in flight.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.run = None;
        self.generation += 1;
    }

    /// Last computed value; does not require the clock to be stopped.
    pub fn current_value(&self) -> f64 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advance to `now_ms`. Returns the completion exactly once per run.
    pub fn tick(&mut self, now_ms: u64) -> Option<ClockCompletion> {
        let run = self.run?;
        if now_ms >= run.deadline_ms() {
            self.value = 1.0;
            self.run = None;
            return Some(ClockCompletion {
                generation: self.generation,
            });
        }
        self.value = run.value_at(now_ms);
        None
    }

    /// Accept a completion if it belongs to the latest run and was not accepted before.
    pub fn acknowledge(&mut self, completion: ClockCompletion) -> bool {
        if completion.generation != self.generation || self.run.is_some() || self.acknowledged {
            return false;
        }
        self.acknowledged = true;
        true
    }

    fn begin(&mut self, duration_ms: u64, now_ms: u64) -> u64 {
        self.generation += 1;
        self.acknowledged = false;
        self.run = Some(ClockRun {
            from: self.value,
            started_at_ms: now_ms,
            duration_ms,
        });
        self.generation
    }
}
