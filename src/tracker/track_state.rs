/// Track lifecycle state.
///
/// A track is created `Active` from an unmatched high-confidence detection,
/// drops to `Coasting` on a frame without a match, returns to `Active` when
/// rematched and becomes `Removed` once it has coasted for the full buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Matched this frame (or just created)
    #[default]
    Active,
    /// Unmatched, kept alive by motion prediction
    Coasting,
    /// Evicted, never reported again
    Removed,
}
