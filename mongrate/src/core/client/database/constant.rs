/// Default name of the collection that stores migration state.
///
/// One document per executed migration; the collection lives alongside the
/// application's own collections and is created lazily by the first insert.
pub const DEFAULT_STATE_COLLECTION: &str = "mongrate";
