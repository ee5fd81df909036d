// Popup module - periodic inspiration prompts
//
// A single task owns the whole schedule: sleep a random whole number of
// minutes, push one message, repeat. The handle is the only way to stop it,
// and dropping the handle stops it too.

use std::time::Duration;

use rand::Rng;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::notify::Notifications;

/// Title/description pairs shown as prompts
pub const MESSAGES: [(&str, &str); 7] = [
    (
        "Transform Your Professional Identity",
        "Create a stunning digital card that makes you stand out from the crowd!",
    ),
    (
        "Networking Made Simple",
        "Share your professional details in seconds with our easy-to-use digital cards.",
    ),
    (
        "Go Paperless, Go Professional",
        "Ditch traditional business cards and embrace the future of networking.",
    ),
    (
        "Make an Impression That Lasts",
        "Your digital card is more than contact info. It's your professional statement.",
    ),
    (
        "Connect With Confidence",
        "Our digital cards help you make meaningful professional connections.",
    ),
    (
        "Your Digital Presence Matters",
        "Make sure your first impression is as professional as you are.",
    ),
    (
        "Stand Out From The Crowd",
        "In a sea of paper cards, be the one they remember with a digital card.",
    ),
];

/// Inclusive range of whole minutes between prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_minutes: u64,
    pub max_minutes: u64,
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_minutes: 5,
            max_minutes: 8,
        }
    }
}

impl DelayRange {
    /// Swaps the bounds if given backwards; never below one minute
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes: min_minutes.min(max_minutes).max(1),
            max_minutes: min_minutes.max(max_minutes).max(1),
        }
    }

    fn pick(&self, rng: &mut impl Rng) -> Duration {
        let minutes = rng.random_range(self.min_minutes..=self.max_minutes);
        Duration::from_secs(minutes * 60)
    }
}

pub struct PopupHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PopupHandle {
    /// Stop the schedule. Nothing is pushed after this returns.
    pub async fn cancel(mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PopupHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the prompt schedule on the current runtime
pub fn spawn_inspiration(notifications: Notifications, range: DelayRange) -> PopupHandle {
    let (tx, mut rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        tracing::debug!(
            min_minutes = range.min_minutes,
            max_minutes = range.max_minutes,
            "Inspiration prompts scheduled"
        );

        loop {
            // ThreadRng is not Send, so draw before awaiting
            let delay = range.pick(&mut rand::rng());

            tokio::select! {
                _ = &mut rx => {
                    tracing::debug!("Inspiration prompts cancelled");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    let index = rand::rng().random_range(0..MESSAGES.len());
                    let (title, description) = MESSAGES[index];
                    notifications.success(title, description);
                }
            }
        }
    });

    PopupHandle {
        cancel: Some(tx),
        task,
    }
}
