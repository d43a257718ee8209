use crate::synth::RandomSource;

/// Outcome of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressTick {
    /// Still below 100; carries the new percentage.
    Advanced(f64),
    /// Reached 100 on this tick. Returned at most once.
    Completed,
    /// Already completed; the tick is ignored.
    Finished,
}

/// Simulated progress bar advanced by random increments per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSimulation {
    percent: f64,
    max_increment: f64,
    finished: bool,
}

impl ProgressSimulation {
    /// Each tick adds `uniform(0, max_increment)`.
    pub fn new(max_increment: f64) -> Self {
        Self {
            percent: 0.0,
            max_increment,
            finished: false,
        }
    }

    pub fn tick<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> ProgressTick {
        if self.finished {
            return ProgressTick::Finished;
        }
        self.percent += rng.uniform(0.0, self.max_increment);
        if self.percent >= 100.0 {
            self.percent = 100.0;
            self.finished = true;
            ProgressTick::Completed
        } else {
            ProgressTick::Advanced(self.percent)
        }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Rounded percentage for display.
    pub fn display_percent(&self) -> u8 {
        self.percent.round().clamp(0.0, 100.0) as u8
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
