use chrono::TimeDelta;

/// Source of monotonic time for the render loop.
pub trait Clock {
    fn monotonic(&self) -> Instant;
}

/// Time elapsed since the clock's origin. Never goes backwards.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct Instant {
    delta: TimeDelta,
}

impl Instant {
    pub fn from_elapsed(delta: TimeDelta) -> Instant {
        Instant { delta }
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.delta
    }

    pub fn elapsed_seconds_f64(&self) -> f64 {
        TD(self.elapsed()).seconds()
    }
}

impl Default for Instant {
    fn default() -> Self {
        Instant::from_elapsed(TimeDelta::zero())
    }
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock {
            origin: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Instant {
        let delta = TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::MAX);
        Instant::from_elapsed(delta)
    }
}

/// Clock advanced explicitly, one frame period at a time.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    elapsed: TimeDelta,
}

impl Default for SimulatedClock {
    fn default() -> Self {
        SimulatedClock::new(TimeDelta::zero())
    }
}

impl SimulatedClock {
    pub fn new(elapsed: TimeDelta) -> SimulatedClock {
        SimulatedClock { elapsed }
    }

    pub fn step(&mut self, delta: TimeDelta) {
        self.elapsed += delta
    }
}

impl Clock for SimulatedClock {
    fn monotonic(&self) -> Instant {
        Instant::from_elapsed(self.elapsed)
    }
}

pub struct TD(pub TimeDelta);

impl TD {
    pub fn seconds(&self) -> f64 {
        self.0.num_seconds() as f64 + (self.0.subsec_nanos() as f64) / 1000000000.0
    }
}

/// Frame period for a target rate, rounded to the microsecond.
pub fn frame_period(fps: f64) -> TimeDelta {
    TimeDelta::microseconds((1000000.0 / fps).round() as i64)
}
