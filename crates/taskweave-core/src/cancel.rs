//! Cancellation signal for in-flight runs.
//!
//! A watch channel fits the shape: one external handle flips the flag once,
//! any number of token clones observe it. If the handle is dropped without
//! cancelling, the token simply never fires.

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is signalled. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if *self.rx.borrow() {
            return;
        }
        loop {
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
            if *self.rx.borrow() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let (handle, mut token) = CancelToken::pair();
        assert!(!token.is_cancelled());

        let waiter = tokio::spawn(async move {
            token.cancelled().await;
            true
        });
        handle.cancel();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_already_cancelled_resolves_immediately() {
        let (handle, mut token) = CancelToken::pair();
        handle.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }
}
