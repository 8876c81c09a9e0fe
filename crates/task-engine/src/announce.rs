//! One-way channel for player-facing notices.

pub trait Announcer {
    fn announce(&mut self, message: &str);
}

/// Forwards announcements to the `announcements` tracing target.
#[derive(Debug, Default)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&mut self, message: &str) {
        tracing::info!(target: "announcements", "{message}");
    }
}

#[derive(Debug, Default)]
pub struct VecAnnouncer {
    pub messages: Vec<String>,
}

impl Announcer for VecAnnouncer {
    fn announce(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
