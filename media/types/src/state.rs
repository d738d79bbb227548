/*!
    Pipeline lifecycle state.
*/

/**
    Lifecycle state of the receive pipeline.

    Native resources (listener, codec session, conversion session) exist if
    and only if the state is [`Starting`], [`Running`] or [`Stopping`]; they
    are fully released before the state returns to [`Idle`] or enters
    [`Error`].

    [`Starting`]: Self::Starting
    [`Running`]: Self::Running
    [`Stopping`]: Self::Stopping
    [`Idle`]: Self::Idle
    [`Error`]: Self::Error
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// No session; ready for `start`.
    Idle,
    /// A worker has been spawned and is constructing the session.
    Starting,
    /// The session is live (or awaiting the first data on the wire).
    Running,
    /// `stop` was requested; the worker is unwinding.
    Stopping,
    /// The last session ended fatally; cleared by the next `start`.
    Error,
}

impl PipelineState {
    /**
        Returns true if a worker owns native resources in this state.
    */
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::Stopping)
    }
}
