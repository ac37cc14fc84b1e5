use time::OffsetDateTime;

/// Source of note timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    now: std::sync::Arc<std::sync::Mutex<OffsetDateTime>>,
}

#[cfg(test)]
impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: std::sync::Arc::new(std::sync::Mutex::new(
                time::macros::datetime!(2024-03-01 09:30:00 UTC),
            )),
        }
    }
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn advance(&self, by: time::Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().expect("clock lock")
    }
}
