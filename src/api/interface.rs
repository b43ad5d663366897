use std::fmt::Debug;

/// The acquisition-level interface object wrapping the camera.
///
/// Consulted before the camera when resolving attribute names, so that
/// acquisition-scoped attributes are served here while everything else
/// falls through to [`Camera`](super::Camera).
pub trait AcquisitionInterface: Debug + Send + Sync {
    /// Number of timing groups scheduled for the next acquisition.
    fn nb_groups(&self) -> eyre::Result<i64>;

    /// Set the number of timing groups.
    fn set_nb_groups(&self, nb_groups: i64) -> eyre::Result<()>;
}
