// ============================================================
// Layer 6 — Progress Reporting
// ============================================================
// Observer that forwards recognizer progress messages to the
// tracing subscriber set up in main.rs.

use crate::domain::traits::Observer;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn update(&self, message: &str) {
        tracing::info!(target: "nn_text_classifier::progress", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::domain::traits::{Observable, ObserverList};

    #[test]
    fn test_registers_as_observer() {
        let mut list = ObserverList::new();
        let observer: Arc<dyn Observer> = Arc::new(TracingObserver);
        list.add_observer(Arc::clone(&observer));
        list.notify_observers("no subscriber installed, message is dropped");
        assert_eq!(list.len(), 1);
    }
}
