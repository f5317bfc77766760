use std::any::Any;

/// A compute-shaped cache stored in [`crate::StateCtx`].
///
/// Computes hold the latest status/result of some derived or fetched value
/// (a list of rows, an authentication status, an action outcome). They are
/// never executed implicitly: commands update them through
/// [`crate::LatestOnlyUpdater::set`], and the owning view reads them back
/// with `StateCtx::compute` after `sync_computes`.
pub trait Compute: Any + Send {
    fn as_any(&self) -> &dyn Any;

    /// Clone this compute into a command snapshot.
    ///
    /// Defaults to `None` (absent from snapshots); override for computes
    /// that other commands read as inputs.
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Replace `self` with a boxed value of the same concrete type.
    ///
    /// Implementations forward to [`assign_impl`].
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared `assign_box` implementation for [`Compute`] types.
pub fn assign_impl<T: Compute + Sized>(dst: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *dst = *value,
        Err(_) => log::warn!(
            "compute assign dropped: boxed value is not {}",
            std::any::type_name::<T>()
        ),
    }
}
