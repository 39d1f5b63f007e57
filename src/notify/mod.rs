//! Outbound notification sink.
//!
//! Delivery is fire-and-forget: a failed dispatch is logged and never
//! fails the request that triggered it, and a persisted confirmation code
//! is not rolled back when the mail goes missing.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tracing::warn;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Default sink: writes the message to the log. Swapped out for a real
/// transport by installing another `Mailer` at startup.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(to, subject, body, "outbound mail");
        Ok(())
    }
}

static MAILER: OnceCell<Box<dyn Mailer>> = OnceCell::new();

pub fn install_mailer(mailer: Box<dyn Mailer>) {
    let _ = MAILER.set(mailer);
}

fn mailer() -> &'static dyn Mailer {
    MAILER.get_or_init(|| Box::new(LogMailer)).as_ref()
}

/// Dispatch the confirmation code without blocking the response.
pub fn dispatch_confirmation_code(email: &str, code: &str) {
    let to = email.to_string();
    let body = format!("Your confirmation code: {}", code);

    tokio::spawn(async move {
        if let Err(e) = mailer().send(&to, "Your confirmation code", &body).await {
            warn!(to = %to, error = %e, "confirmation code dispatch failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct RecordingMailer(mpsc::UnboundedSender<(String, String)>);

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, _subject: &str, body: &str) -> anyhow::Result<()> {
            let _ = self.0.send((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_the_installed_mailer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        install_mailer(Box::new(RecordingMailer(tx)));

        dispatch_confirmation_code("alice@example.com", "code-123");

        let (to, body) = rx.recv().await.expect("dispatched");
        assert_eq!(to, "alice@example.com");
        assert!(body.contains("code-123"));
    }
}
