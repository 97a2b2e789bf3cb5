//! Scoped timing through the `log` facade.

use std::borrow::Cow;
use std::time::{Duration, Instant};

/// Logs how long a scope took when dropped.
///
/// ```ignore
/// let _t = Timed::info("Expand vertices");
/// // ... work ...
/// // logs "Expand vertices: 1.234ms"
/// ```
pub struct Timed {
    label: Cow<'static, str>,
    start: Instant,
    level: log::Level,
}

impl Timed {
    pub fn info(label: impl Into<Cow<'static, str>>) -> Self {
        Self::at(label.into(), log::Level::Info)
    }

    pub fn debug(label: impl Into<Cow<'static, str>>) -> Self {
        Self::at(label.into(), log::Level::Debug)
    }

    fn at(label: Cow<'static, str>, level: log::Level) -> Self {
        log::trace!("{label}...");
        Self {
            label,
            start: Instant::now(),
            level,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.label, self.elapsed());
    }
}
