// Keyswap Event Handling
// Event source abstraction and the remap routing loop

mod router;
mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use router::{EventRouter, RouterError};
pub use source::{EvdevSource, EventSource, SourcePoll};

/// Cooperative cancellation flag, polled once per router iteration.
///
/// Clones share the flag; the signal thread holds one clone and the router
/// another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());

        clone.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }
}
