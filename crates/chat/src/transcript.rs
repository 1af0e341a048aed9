use wello_shared::Role;

/// One entry in the message log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub sender: Role,
    pub text: String,
}

/// Append-only message log backing the chat view.
///
/// Text is stored and rendered verbatim as plain text; nothing in it is
/// ever interpreted as markup.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Role, text: impl Into<String>) {
        self.entries.push(Entry {
            sender,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
