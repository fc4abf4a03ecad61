use std::path::PathBuf;

/// How the delay and sound timers are driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TimerMode {
    /// the interpreter ticks both timers at the end of every step
    #[default]
    PerStep,
    /// the host ticks both timers once per frame, independent of how many
    /// instructions ran in it
    Fixed,
}

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Everything the host needs to know to run a ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rom_path: PathBuf,
    pub instructions_per_second: u32,
    /// display refresh, and the timer rate in `TimerMode::Fixed`
    pub frame_rate: u32,
    pub timer_mode: TimerMode,
    /// fixed seed for the random instruction; entropy if None
    pub seed: Option<u64>,
}

impl Config {
    /// instructions to run between two frames, at least one
    pub fn steps_per_frame(&self) -> u32 {
        (self.instructions_per_second / self.frame_rate.max(1)).max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rom_path: PathBuf::new(),
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            frame_rate: DEFAULT_FRAME_RATE,
            timer_mode: TimerMode::Fixed,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_per_frame() {
        let c = Config::default();
        assert_eq!(c.steps_per_frame(), 11);
    }

    #[test]
    fn test_steps_per_frame_never_zero() {
        let c = Config {
            instructions_per_second: 10,
            frame_rate: 60,
            ..Config::default()
        };
        assert_eq!(c.steps_per_frame(), 1);

        let c = Config {
            frame_rate: 0,
            ..Config::default()
        };
        assert_eq!(c.steps_per_frame(), 700);
    }
}
