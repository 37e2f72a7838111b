/// Elapsed-time counter for one submitted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingSession {
    elapsed_seconds: u32,
    active: bool,
}

impl LoadingSession {
    pub fn start() -> Self {
        Self {
            elapsed_seconds: 0,
            active: true,
        }
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn label(&self) -> String {
        timer_label(self.elapsed_seconds)
    }

    /// Advances one second. Ticks delivered after `stop` are ignored.
    pub fn tick(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        Some(self.label())
    }

    pub fn stop(&mut self) {
        self.active = false;
    }
}

pub fn timer_label(seconds: u32) -> String {
    format!("{seconds}s")
}

/// Which optional targets exist around the submitted form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitTargets {
    pub container: bool,
    pub indicator: bool,
    pub timer: bool,
    pub submit_control: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPlan {
    pub show_indicator: bool,
    /// Present only when the indicator has a timer display.
    pub session: Option<LoadingSession>,
    /// Busy label for the submit control; `Some` also means disable it.
    pub submit_label: Option<String>,
}

impl SubmitPlan {
    pub fn for_targets(targets: SubmitTargets, busy_label: &str) -> Self {
        if !targets.container {
            return Self::nothing();
        }

        Self {
            show_indicator: targets.indicator,
            session: (targets.indicator && targets.timer).then(LoadingSession::start),
            submit_label: targets.submit_control.then(|| busy_label.to_string()),
        }
    }

    pub fn nothing() -> Self {
        Self {
            show_indicator: false,
            session: None,
            submit_label: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.show_indicator && self.session.is_none() && self.submit_label.is_none()
    }
}
