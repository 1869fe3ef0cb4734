use crate::core::models::CardEntry;

type Subscriber = Box<dyn FnMut(&[CardEntry])>;

/// Append-only list of card entries.
///
/// Subscribers are handed the whole list after every append and are expected
/// to redraw all of it.
#[derive(Default)]
pub struct CardList {
    entries: Vec<CardEntry>,
    subscribers: Vec<Subscriber>,
}

impl CardList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&[CardEntry]) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Appends `entry` and returns its index.
    pub fn append(&mut self, entry: CardEntry) -> usize {
        self.entries.push(entry);
        for subscriber in &mut self.subscribers {
            subscriber(&self.entries);
        }
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CardEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CardEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardEntry> {
        self.entries.iter()
    }
}

impl std::fmt::Debug for CardList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardList")
            .field("entries", &self.entries)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
