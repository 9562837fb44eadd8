/// Focus-session countdown lengths, in seconds.
pub const WORK_SECONDS: u32 = 25 * 60;
pub const BREAK_SECONDS: u32 = 5 * 60;

/// Countdown for focus sessions. The UI ticks it once per second; it
/// stops at zero or on cancellation and never touches the task
/// collection.
#[derive(Debug, Default)]
pub struct FocusTimer {
    remaining: u32,
    running: bool,
}

impl FocusTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a 25-minute work session.
    pub fn start_work(&mut self) {
        self.remaining = WORK_SECONDS;
        self.running = true;
    }

    /// Begin a 5-minute break.
    pub fn start_break(&mut self) {
        self.remaining = BREAK_SECONDS;
        self.running = true;
    }

    /// Count down one second; stops once the countdown reaches zero.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
        }
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// m:ss display form.
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
