use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one triggered note; also seeds its noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u64);

// atomic so ids stay unique no matter which thread builds the graph
pub fn next_note_id() -> NoteId {
    NoteId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}
