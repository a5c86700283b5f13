/// Immediate acknowledgment for a play request. Resolution continues in the
/// background; this only reports what could be determined synchronously.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayReceipt {
    /// The link after normalization.
    pub url: String,
    /// True when a music-subdomain link was rewritten to the canonical domain.
    pub rewritten: bool,
    /// True when the link looks like a playlist and will be expanded.
    pub playlist: bool,
    /// False when no voice sink is connected; the item is still queued.
    pub connected: bool,
}
