//! Terminal side of the alert presenter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::core::rig_monitor::{AlertKind, Annunciator};

/// Notification currently waiting for the operator
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: AlertKind,
    pub message: String,
    pub raised_at: DateTime<Local>,
}

/// Shared slot holding the notification the dashboard should draw, and
/// the bell it should ring between frames
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    slot: Arc<Mutex<Option<Notice>>>,
    bell: Arc<AtomicBool>,
}

impl NoticeBoard {
    pub fn current(&self) -> Option<Notice> {
        self.slot.lock().clone()
    }

    fn post(&self, notice: Notice) {
        *self.slot.lock() = Some(notice);
    }

    /// Whether a bell was requested since the last call
    pub fn take_bell(&self) -> bool {
        self.bell.swap(false, Ordering::SeqCst)
    }

    fn ring(&self) {
        self.bell.store(true, Ordering::SeqCst);
    }

    fn take_if(&self, kind: AlertKind) {
        let mut slot = self.slot.lock();
        if slot.as_ref().map(|n| n.kind) == Some(kind) {
            *slot = None;
        }
    }
}

/// Shows alerts as a dashboard popup and asks for the terminal bell.
///
/// Runs on the alarm workers, which must not write to the terminal while
/// a frame is being drawn; the dashboard loop rings the bell instead.
pub struct TerminalAnnunciator {
    board: NoticeBoard,
    bell: bool,
}

impl TerminalAnnunciator {
    pub fn new(board: NoticeBoard) -> Self {
        Self { board, bell: true }
    }

    /// Popup only, no bell
    pub fn silent(board: NoticeBoard) -> Self {
        Self { board, bell: false }
    }
}

impl Annunciator for TerminalAnnunciator {
    fn show(&self, kind: AlertKind, message: &str) {
        self.board.post(Notice {
            kind,
            message: message.to_string(),
            raised_at: Local::now(),
        });
    }

    fn dismiss(&self, kind: AlertKind) {
        self.board.take_if(kind);
    }

    fn chime(&self) {
        if self.bell {
            self.board.ring();
        }
    }
}
