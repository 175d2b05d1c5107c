/// A command routed over the command bus.
///
/// Commands represent **intent**: a request to create, change or query something.
/// They are transient (never persisted) and are delivered to every subscriber;
/// the bus does not pre-filter by target.
///
/// ## Targeting
///
/// Most commands address one entity through `target()`. Subscribers compare it
/// against their own identity and ignore commands meant for others. Broadcast
/// commands (e.g. "a creation was requested") return `None`.
///
/// ## Design Constraints
///
/// Commands must be:
/// - **Cloneable**: commands may be copied for logging and retries
/// - **Send + Sync**: the bus itself is shareable across threads
/// - **'static**: commands own all their data
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Identifier type of the entities this command can address.
    type Target: Clone + Eq + core::fmt::Debug;

    /// The addressed entity, or `None` for broadcast commands.
    fn target(&self) -> Option<&Self::Target>;

    /// Stable command name for logging (e.g. "ware.add_amount").
    fn name(&self) -> &'static str;
}
