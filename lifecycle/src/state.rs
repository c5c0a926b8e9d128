#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Validating,
    CleaningStale,
    Starting,
    Running,
    Terminating,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Idle => write!(f, "idle"),
            State::Validating => write!(f, "validating"),
            State::CleaningStale => write!(f, "cleaning-stale"),
            State::Starting => write!(f, "starting"),
            State::Running => write!(f, "running"),
            State::Terminating => write!(f, "terminating"),
        }
    }
}
