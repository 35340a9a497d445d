use serde::{Deserialize, Serialize};

/// Default capacity of the endpoint and csys histories.
pub const MRU_CAPACITY: usize = 10;

/// Most-recently-used list of strings, newest first.
///
/// Never holds duplicates and never grows past its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MruList {
    items: Vec<String>,
    capacity: usize,
}

impl MruList {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn from_items<I: IntoIterator<Item = String>>(items: I, capacity: usize) -> Self {
        let mut list = Self::new(capacity);
        let mut items: Vec<String> = items.into_iter().collect();
        // pushing oldest first leaves the original order intact
        items.reverse();
        for item in items {
            list.push(item);
        }
        list
    }

    /// Moves `item` to the front, evicting the oldest entry on overflow.
    pub fn push(&mut self, item: impl Into<String>) {
        let item = item.into();
        if self.items.first() == Some(&item) {
            return;
        }
        self.items.retain(|existing| *existing != item);
        self.items.insert(0, item);
        self.items.truncate(self.capacity);
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn first(&self) -> Option<&str> {
        self.items.first().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for MruList {
    fn default() -> Self {
        Self::new(MRU_CAPACITY)
    }
}

impl From<Vec<String>> for MruList {
    fn from(items: Vec<String>) -> Self {
        Self::from_items(items, MRU_CAPACITY)
    }
}

impl From<MruList> for Vec<String> {
    fn from(list: MruList) -> Self {
        list.items
    }
}
