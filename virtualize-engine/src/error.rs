use crate::HostHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VirtualizeError {
    /// The handle still owns a live instance; `dispose` it before initializing again.
    #[error("virtualize handle {0} is already initialized")]
    AlreadyInitialized(HostHandle),
}

pub type Result<T, E = VirtualizeError> = core::result::Result<T, E>;
