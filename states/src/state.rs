use std::any::Any;

/// A unit of application state stored in [`crate::StateCtx`].
///
/// States are mutated synchronously by the owning view through
/// `StateCtx::state_mut`/`update`, or replaced wholesale when an async
/// command publishes a new value through an updater.
pub trait State: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone this state into a command snapshot.
    ///
    /// The default returns `None`, which keeps the state out of snapshots
    /// entirely; a command that reads it will panic with a pointed message.
    /// Override with `Some(Box::new(self.clone()))` for every state that
    /// commands consume.
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Replace `self` with a boxed value of the same concrete type.
    ///
    /// Implementations forward to [`state_assign_impl`].
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared `assign_box` implementation for [`State`] types.
pub fn state_assign_impl<T: State + Sized>(dst: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *dst = *value,
        Err(_) => log::warn!(
            "state assign dropped: boxed value is not {}",
            std::any::type_name::<T>()
        ),
    }
}
