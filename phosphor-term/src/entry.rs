use compact_str::{CompactString, ToCompactString, format_compact};

/// How long after the last keystroke the session still counts as "typing".
pub const TYPING_TIMEOUT_MS: f64 = 250.0;

/// Unique, stable identifier for a terminal entry.
///
/// Ids are allocated monotonically per session and are never reused, so they
/// remain valid keys even after pending entries are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// Content carried by a terminal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Plain text, possibly spanning multiple lines.
    Text(CompactString),
    /// An echoed command with its output, if any, below it.
    Command {
        command: CompactString,
        output: Option<CompactString>,
    },
    /// Placeholder for an async reply that has not arrived yet.
    Pending,
}

/// One line item in the terminal log.
///
/// Entries are immutable once created; the only lifecycle exception is
/// [`EntryKind::Pending`], which is removed and replaced in place when its
/// reply resolves or fails (see [`TerminalSession::resolve_pending`]).
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalEntry {
    id: EntryId,
    kind: EntryKind,
    created_at_ms: f64,
}

impl TerminalEntry {
    /// Returns the entry's stable identifier.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Returns the entry's content kind.
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Creation timestamp in host milliseconds.
    pub fn created_at_ms(&self) -> f64 {
        self.created_at_ms
    }

    /// Renders the entry to the text the synthesizer rasterizes.
    pub fn render_text(&self) -> CompactString {
        match &self.kind {
            EntryKind::Text(text) => text.clone(),
            EntryKind::Command { command, output } => match output {
                Some(output) => format_compact!("> {command}\n{output}"),
                None => format_compact!("> {command}"),
            },
            EntryKind::Pending => CompactString::const_new("..."),
        }
    }
}

/// Read-only view of the terminal state, taken once per synthesis tick.
#[derive(Debug, Clone, Copy)]
pub struct TerminalSnapshot<'a> {
    /// Entries in insertion order, oldest first.
    pub entries: &'a [TerminalEntry],
    /// The live input line, without the prompt.
    pub input: &'a str,
    /// Whether a keystroke landed within the typing timeout.
    pub is_typing: bool,
}

/// Append-only terminal log plus the live input line.
///
/// Owned by the conversational UI layer; the rendering core only consumes
/// [`TerminalSnapshot`]s of it.
#[derive(Debug, Default)]
pub struct TerminalSession {
    entries: Vec<TerminalEntry>,
    input: String,
    next_id: u64,
    last_keystroke_ms: Option<f64>,
}

impl TerminalSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_entry(&mut self, kind: EntryKind, now_ms: f64) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(TerminalEntry { id, kind, created_at_ms: now_ms });
        id
    }

    /// Appends a plain text entry.
    pub fn push_text(&mut self, text: impl AsRef<str>, now_ms: f64) -> EntryId {
        let text = text.as_ref().to_compact_string();
        self.alloc_entry(EntryKind::Text(text), now_ms)
    }

    /// Appends an echoed command entry with optional output.
    pub fn push_command(
        &mut self,
        command: impl AsRef<str>,
        output: Option<&str>,
        now_ms: f64,
    ) -> EntryId {
        let kind = EntryKind::Command {
            command: command.as_ref().to_compact_string(),
            output: output.map(|s| s.to_compact_string()),
        };
        self.alloc_entry(kind, now_ms)
    }

    /// Appends a pending placeholder for a reply that is still in flight.
    pub fn begin_pending(&mut self, now_ms: f64) -> EntryId {
        self.alloc_entry(EntryKind::Pending, now_ms)
    }

    /// Replaces a pending entry with the resolved reply text.
    ///
    /// The replacement keeps the log position but is a new entry with a new
    /// id. Returns the new id, or `None` if `id` no longer names a pending
    /// entry.
    pub fn resolve_pending(
        &mut self,
        id: EntryId,
        text: impl AsRef<str>,
        now_ms: f64,
    ) -> Option<EntryId> {
        self.replace_pending(id, EntryKind::Text(text.as_ref().to_compact_string()), now_ms)
    }

    /// Replaces a pending entry with an error message.
    pub fn fail_pending(
        &mut self,
        id: EntryId,
        message: impl AsRef<str>,
        now_ms: f64,
    ) -> Option<EntryId> {
        let text = format_compact!("error: {}", message.as_ref());
        self.replace_pending(id, EntryKind::Text(text), now_ms)
    }

    fn replace_pending(&mut self, id: EntryId, kind: EntryKind, now_ms: f64) -> Option<EntryId> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id && e.kind == EntryKind::Pending)?;

        let new_id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries[idx] = TerminalEntry { id: new_id, kind, created_at_ms: now_ms };
        Some(new_id)
    }

    /// Entries in insertion order, oldest first.
    pub fn entries(&self) -> &[TerminalEntry] {
        &self.entries
    }

    /// The live input line, without the prompt.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Records a typed character and refreshes the typing timeout.
    pub fn push_input_char(&mut self, ch: char, now_ms: f64) {
        self.input.push(ch);
        self.note_keystroke(now_ms);
    }

    /// Removes the last character of the input line, if any.
    pub fn backspace(&mut self, now_ms: f64) {
        self.input.pop();
        self.note_keystroke(now_ms);
    }

    /// Refreshes the typing timeout without changing the input.
    pub fn note_keystroke(&mut self, now_ms: f64) {
        self.last_keystroke_ms = Some(now_ms);
    }

    /// Submits the input line as a text entry, clearing the input.
    ///
    /// Blank input submits nothing, matching the enter-key behavior of the
    /// surrounding UI. Returns the new entry's id when one was created.
    pub fn submit_input(&mut self, now_ms: f64) -> Option<EntryId> {
        self.note_keystroke(now_ms);
        let input = std::mem::take(&mut self.input);
        if input.trim().is_empty() {
            return None;
        }
        Some(self.push_text(input, now_ms))
    }

    /// Whether a keystroke landed within [`TYPING_TIMEOUT_MS`] of `now_ms`.
    pub fn is_typing(&self, now_ms: f64) -> bool {
        self.last_keystroke_ms
            .is_some_and(|last| now_ms - last < TYPING_TIMEOUT_MS)
    }

    /// Takes a read-only snapshot for one synthesis tick.
    pub fn snapshot(&self, now_ms: f64) -> TerminalSnapshot<'_> {
        TerminalSnapshot {
            entries: &self.entries,
            input: &self.input,
            is_typing: self.is_typing(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ids_are_unique_and_stable() {
        let mut session = TerminalSession::new();
        let a = session.push_text("one", 0.0);
        let b = session.push_text("two", 1.0);
        assert_ne!(a, b);
        assert_eq!(session.entries()[0].id(), a);
        assert_eq!(session.entries()[1].id(), b);
    }

    #[test]
    fn pending_resolves_in_place() {
        let mut session = TerminalSession::new();
        let first = session.push_text("hello", 0.0);
        let pending = session.begin_pending(1.0);
        let last = session.push_text("world", 2.0);

        let resolved = session
            .resolve_pending(pending, "reply", 3.0)
            .expect("pending entry should resolve");

        let ids: Vec<_> = session.entries().iter().map(TerminalEntry::id).collect();
        assert_eq!(ids, vec![first, resolved, last]);
        assert_eq!(session.entries()[1].render_text(), "reply");

        // a second resolve of the same id is a no-op
        assert!(session.resolve_pending(pending, "again", 4.0).is_none());
    }

    #[test]
    fn fail_pending_renders_error_text() {
        let mut session = TerminalSession::new();
        let pending = session.begin_pending(0.0);
        session.fail_pending(pending, "backend unreachable", 1.0);
        assert_eq!(session.entries()[0].render_text(), "error: backend unreachable");
    }

    #[test]
    fn command_entries_render_prompt_and_output() {
        let mut session = TerminalSession::new();
        session.push_command("ls", Some("a  b"), 0.0);
        session.push_command("clear", None, 1.0);
        assert_eq!(session.entries()[0].render_text(), "> ls\na  b");
        assert_eq!(session.entries()[1].render_text(), "> clear");
    }

    #[test]
    fn typing_flag_expires() {
        let mut session = TerminalSession::new();
        assert!(!session.is_typing(0.0));
        session.push_input_char('x', 100.0);
        assert!(session.is_typing(100.0 + TYPING_TIMEOUT_MS - 1.0));
        assert!(!session.is_typing(100.0 + TYPING_TIMEOUT_MS));
    }

    #[test]
    fn blank_input_does_not_submit() {
        let mut session = TerminalSession::new();
        session.push_input_char(' ', 0.0);
        assert!(session.submit_input(1.0).is_none());
        assert!(session.entries().is_empty());
        assert_eq!(session.input(), "");
    }

    #[test]
    fn submit_clears_input_and_appends() {
        let mut session = TerminalSession::new();
        for ch in "wor".chars() {
            session.push_input_char(ch, 0.0);
        }
        let id = session.submit_input(1.0).expect("non-blank input submits");
        assert_eq!(session.input(), "");
        assert_eq!(session.entries().last().map(TerminalEntry::id), Some(id));
        assert_eq!(session.entries().last().unwrap().render_text(), "wor");
    }
}
