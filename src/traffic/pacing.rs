use std::time::Duration;

use rand::Rng;

/// Think time between requests of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    Fixed(Duration),
    /// Uniform in `[0, max)`.
    Uniform { max: Duration },
    None,
}

impl Pacing {
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        match *self {
            Pacing::Fixed(delay) => delay,
            Pacing::Uniform { max } => {
                let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
                if max_ms == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
            }
            Pacing::None => Duration::ZERO,
        }
    }
}
