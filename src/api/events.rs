use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::ViewportSnapshot;
use crate::interaction::SelectionKind;
use crate::spec::Label;
use crate::worker::{ClosestPoint, SelectionResult};

/// Event names hosts subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ZoomIn,
    ZoomOut,
    Pan,
    OnSelection,
    OnSelectionEnd,
    PointHovered,
    PointClicked,
    LabelClicked,
    LabelHovered,
    LabelUnhovered,
    FrameRendered,
}

impl EventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZoomIn => "zoomIn",
            Self::ZoomOut => "zoomOut",
            Self::Pan => "pan",
            Self::OnSelection => "onSelection",
            Self::OnSelectionEnd => "onSelectionEnd",
            Self::PointHovered => "pointHovered",
            Self::PointClicked => "pointClicked",
            Self::LabelClicked => "labelClicked",
            Self::LabelHovered => "labelHovered",
            Self::LabelUnhovered => "labelUnhovered",
            Self::FrameRendered => "frameRendered",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of the label events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelEvent {
    pub label: String,
    pub index: usize,
    pub label_object: Label,
}

impl LabelEvent {
    #[must_use]
    pub fn from_label(label: &Label) -> Self {
        Self {
            label: label.text.clone(),
            index: label.index,
            label_object: label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "camelCase")]
pub enum VizEvent {
    ZoomIn(ViewportSnapshot),
    ZoomOut(ViewportSnapshot),
    Pan(ViewportSnapshot),
    OnSelection {
        #[serde(rename = "type")]
        kind: SelectionKind,
        bounds: Vec<f64>,
    },
    OnSelectionEnd {
        #[serde(rename = "type")]
        kind: SelectionKind,
        selection: SelectionResult,
    },
    PointHovered(ClosestPoint),
    PointClicked(ClosestPoint),
    LabelClicked(LabelEvent),
    LabelHovered(LabelEvent),
    LabelUnhovered(LabelEvent),
    FrameRendered { frame: u64, instances: usize },
}

impl VizEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ZoomIn(_) => EventKind::ZoomIn,
            Self::ZoomOut(_) => EventKind::ZoomOut,
            Self::Pan(_) => EventKind::Pan,
            Self::OnSelection { .. } => EventKind::OnSelection,
            Self::OnSelectionEnd { .. } => EventKind::OnSelectionEnd,
            Self::PointHovered(_) => EventKind::PointHovered,
            Self::PointClicked(_) => EventKind::PointClicked,
            Self::LabelClicked(_) => EventKind::LabelClicked,
            Self::LabelHovered(_) => EventKind::LabelHovered,
            Self::LabelUnhovered(_) => EventKind::LabelUnhovered,
            Self::FrameRendered { .. } => EventKind::FrameRendered,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&VizEvent)>;

/// Per-kind listener registry. Listeners run in registration order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: IndexMap<ListenerId, (EventKind, Listener)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("next_id", &self.next_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&VizEvent) + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(id, (kind, Box::new(listener)));
        id
    }

    /// Returns `true` when a listener was removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.shift_remove(&id).is_some()
    }

    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .values()
            .filter(|(registered, _)| *registered == kind)
            .count()
    }

    /// Calls every listener registered for the event's kind; returns how many ran.
    pub fn dispatch(&mut self, event: &VizEvent) -> usize {
        let kind = event.kind();
        let mut notified = 0;
        for (registered, listener) in self.listeners.values_mut() {
            if *registered == kind {
                listener(event);
                notified += 1;
            }
        }
        notified
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{EventBus, EventKind, VizEvent};

    #[test]
    fn dispatch_reaches_only_matching_kind() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::FrameRendered, move |event| {
            sink.borrow_mut().push(event.kind());
        });

        let notified = bus.dispatch(&VizEvent::FrameRendered {
            frame: 1,
            instances: 3,
        });
        assert_eq!(notified, 1);
        assert_eq!(
            bus.dispatch(&VizEvent::OnSelection {
                kind: crate::interaction::SelectionKind::Box,
                bounds: vec![0.0; 4],
            }),
            0
        );
        assert_eq!(seen.borrow().as_slice(), &[EventKind::FrameRendered]);
    }

    #[test]
    fn unsubscribe_removes_listener() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(EventKind::Pan, |_| {});
        assert_eq!(bus.listener_count(EventKind::Pan), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(EventKind::Pan), 0);
    }

    #[test]
    fn event_serializes_with_kind_name() {
        let json = serde_json::to_value(VizEvent::FrameRendered {
            frame: 2,
            instances: 0,
        })
        .expect("serialize");
        assert_eq!(json["type"], EventKind::FrameRendered.as_str());
    }
}
