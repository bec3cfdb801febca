#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Brackets a synchronous step with `PhaseStart`/`PhaseFinish` events.
    /// The finish event is sent whether or not the step succeeded.
    pub fn phase<T>(&self, name: &'static str, step: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let outcome = step();
        self.report(Progress::PhaseFinish);
        outcome
    }
}
