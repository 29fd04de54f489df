//! Viewport change detection.
//!
//! The viewport exposes no dependable change events, so it is sampled on a
//! fixed cadence. [`detect`] compares two samples without side effects; the
//! engine decides how to react to each [`Transition`].

use std::time::Duration;

use crate::adapter::Viewport;
use crate::modality::Modality;

pub const POLL_INTERVAL: Duration = Duration::from_millis(350);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewportSnapshot {
    pub current_index: usize,
    pub stack_size: usize,
    pub image_identity: Option<String>,
    pub modality: Modality,
}

impl ViewportSnapshot {
    pub fn capture(viewport: &Viewport<'_>) -> Self {
        Self {
            current_index: viewport.current_index(),
            stack_size: viewport.stack_size(),
            image_identity: viewport.image_identity(),
            modality: viewport.modality(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stack_size == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ImageChanged {
        from: Option<String>,
        to: Option<String>,
    },
    ModalityChanged {
        from: Option<Modality>,
        to: Modality,
    },
    SliceChanged {
        from: usize,
        to: usize,
    },
    StackResized {
        from: usize,
        to: usize,
    },
}

/// Transitions between `prev` and `next`. With no previous sample the
/// modality is always reported, and the image when one is showing.
pub fn detect(prev: Option<&ViewportSnapshot>, next: &ViewportSnapshot) -> Vec<Transition> {
    let Some(prev) = prev else {
        let mut transitions = vec![Transition::ModalityChanged {
            from: None,
            to: next.modality,
        }];
        if next.image_identity.is_some() {
            transitions.push(Transition::ImageChanged {
                from: None,
                to: next.image_identity.clone(),
            });
        }
        return transitions;
    };

    let mut transitions = Vec::new();
    if prev.modality != next.modality {
        transitions.push(Transition::ModalityChanged {
            from: Some(prev.modality),
            to: next.modality,
        });
    }
    if prev.image_identity != next.image_identity {
        transitions.push(Transition::ImageChanged {
            from: prev.image_identity.clone(),
            to: next.image_identity.clone(),
        });
    }
    if prev.stack_size != next.stack_size {
        transitions.push(Transition::StackResized {
            from: prev.stack_size,
            to: next.stack_size,
        });
    }
    if prev.current_index != next.current_index {
        transitions.push(Transition::SliceChanged {
            from: prev.current_index,
            to: next.current_index,
        });
    }
    transitions
}

#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last: Option<ViewportSnapshot>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, next: ViewportSnapshot) -> Vec<Transition> {
        let transitions = detect(self.last.as_ref(), &next);
        self.last = Some(next);
        transitions
    }

    pub fn last(&self) -> Option<&ViewportSnapshot> {
        self.last.as_ref()
    }

    /// Records a slice move made by the engine itself, so the counter and
    /// scene follow it before the next sample. No-op before the first sample.
    pub fn record_index(&mut self, index: usize) {
        if let Some(last) = self.last.as_mut() {
            last.current_index = index;
        }
    }

    /// Forgets the previous sample, e.g. when the viewport goes away.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
