use crossterm::event::KeyCode;

/// Events that can occur in the rig dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Ask to close the application (refused while logging)
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Start or stop the publisher's logger
    ToggleLogging,
    /// Zero the screwjack position at the current reading
    ResetOffset,
    /// Acknowledge the alert on screen
    Acknowledge,
    /// No action
    None,
}

impl MonitorEvent {
    pub fn from_key(code: KeyCode) -> Self {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => MonitorEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => MonitorEvent::ToggleHelp,
            KeyCode::Char('l') => MonitorEvent::ToggleLogging,
            KeyCode::Char('z') => MonitorEvent::ResetOffset,
            KeyCode::Char('a') | KeyCode::Enter => MonitorEvent::Acknowledge,
            _ => MonitorEvent::None,
        }
    }
}
