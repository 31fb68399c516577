//! Per-recording pool of channels, attributes and flight-phase spans.

pub mod attribute;
pub mod channel;
pub mod span;

pub use attribute::{Attribute, AttributeValue};
pub use channel::{Channel, MaskedArray, Timebase};
pub use span::{PhaseKind, Span};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Everything known about one flight: decoded channels, attributes and the
/// spans supplied by phase segmentation. Derived channels are published back
/// into the same pool.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    channels: BTreeMap<String, Arc<Channel>>,
    attributes: BTreeMap<String, Attribute>,
    spans: BTreeMap<PhaseKind, Vec<Span>>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a channel. Channels are immutable once published; a second
    /// channel with the same name replaces the first.
    pub fn insert_channel(&mut self, channel: Channel) {
        self.channels
            .insert(channel.name.clone(), Arc::new(channel));
    }

    pub fn insert_attribute(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    /// Adds spans, keeping each kind ordered by start index.
    pub fn insert_spans<I: IntoIterator<Item = Span>>(&mut self, spans: I) {
        for span in spans {
            self.spans.entry(span.kind).or_default().push(span);
        }
        for list in self.spans.values_mut() {
            list.sort_by_key(|span| span.start);
        }
    }

    pub fn channel(&self, name: &str) -> Option<&Arc<Channel>> {
        self.channels.get(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn spans(&self, kind: PhaseKind) -> &[Span] {
        self.spans.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Names a node may depend on: channels, attributes and span kinds.
    pub fn available(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.channels.keys().cloned().collect();
        names.extend(self.attributes.keys().cloned());
        names.extend(
            self.spans
                .iter()
                .filter(|(_, spans)| !spans.is_empty())
                .map(|(kind, _)| kind.name().to_string()),
        );
        names
    }
}
