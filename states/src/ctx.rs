use std::any::{TypeId, type_name};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::updater::UpdateMsg;
use crate::{
    Command, CommandSnapshot, Compute, ComputeSnapshot, Error, LatestOnlyUpdater, State,
    StateSnapshot, TaskHandle, TaskId, Updater,
};

struct RegisteredCommand {
    command: Box<dyn Command>,
    latest: Arc<AtomicU64>,
    next_generation: u64,
    handle: Option<TaskHandle>,
}

/// Owner of all registered states, computes, and commands.
///
/// The owning side (a view loop, the CLI, a test harness) drives the cycle:
///
/// 1. mutate input states via [`StateCtx::update`]
/// 2. [`StateCtx::enqueue_command`] + [`StateCtx::flush_commands`]
/// 3. await tasks through [`StateCtx::task_set_mut`]
/// 4. [`StateCtx::sync_computes`] to apply published results
/// 5. read back via [`StateCtx::compute`] / [`StateCtx::state`]
///
/// `flush_commands` spawns onto the current tokio runtime, so steps 2–4
/// must run inside one.
pub struct StateCtx {
    states: BTreeMap<TypeId, Box<dyn State>>,
    computes: BTreeMap<TypeId, Box<dyn Compute>>,
    commands: BTreeMap<TypeId, RegisteredCommand>,
    queue: Vec<TypeId>,
    tx: flume::Sender<UpdateMsg>,
    rx: flume::Receiver<UpdateMsg>,
    tasks: JoinSet<()>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            computes: BTreeMap::new(),
            commands: BTreeMap::new(),
            queue: Vec::new(),
            tx,
            rx,
            tasks: JoinSet::new(),
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(TypeId::of::<T>(), Box::new(state));
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        self.computes.insert(TypeId::of::<T>(), Box::new(compute));
    }

    pub fn record_command<T: Command>(&mut self, command: T) {
        self.commands.insert(
            TypeId::of::<T>(),
            RegisteredCommand {
                command: Box::new(command),
                latest: Arc::new(AtomicU64::new(0)),
                next_generation: 0,
                handle: None,
            },
        );
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(TypeId::of::<T>(), type_name::<T>()))
    }

    /// # Panics
    ///
    /// Panics if the state was never registered with [`StateCtx::add_state`].
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// # Panics
    ///
    /// Panics if the state was never registered.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|state| state.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| panic!("state not registered: {}", type_name::<T>()))
    }

    /// Mutate a registered state in place.
    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        f(self.state_mut::<T>());
    }

    pub fn try_compute<T: Compute>(&self) -> Result<&T, Error> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|compute| compute.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::compute_not_found(TypeId::of::<T>(), type_name::<T>()))
    }

    /// # Panics
    ///
    /// Panics if the compute was never registered with
    /// [`StateCtx::record_compute`].
    pub fn compute<T: Compute>(&self) -> &T {
        self.try_compute::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// An updater for pushing values from outside a command (tests, setup).
    pub fn updater(&self) -> Updater {
        Updater::new(self.tx.clone())
    }

    /// Queue a command for the next [`StateCtx::flush_commands`].
    ///
    /// # Panics
    ///
    /// Panics if the command was never registered with
    /// [`StateCtx::record_command`].
    pub fn enqueue_command<T: Command>(&mut self) {
        let type_id = TypeId::of::<T>();
        assert!(
            self.commands.contains_key(&type_id),
            "command not registered: {}",
            type_name::<T>()
        );
        self.queue.push(type_id);
    }

    /// Spawn every queued command into the task set.
    ///
    /// Each spawn bumps the command type's generation and cancels the
    /// previous task's token, so only the newest dispatch of a type
    /// delivers updates.
    pub fn flush_commands(&mut self) {
        let queued = std::mem::take(&mut self.queue);
        for type_id in queued {
            let snap = self.build_snapshot();
            let base = Updater::new(self.tx.clone());
            let Some(entry) = self.commands.get_mut(&type_id) else {
                log::warn!("flush dropped unregistered command {type_id:?}");
                continue;
            };
            let generation = entry.next_generation;
            entry.next_generation += 1;
            entry.latest.store(generation, Ordering::Release);
            if let Some(previous) = entry.handle.take() {
                previous.cancel();
            }
            let token = CancellationToken::new();
            let updater = LatestOnlyUpdater::new(base, generation, Arc::clone(&entry.latest));
            let future = entry.command.run(snap, updater, token.clone());
            entry.handle = Some(TaskHandle::new(TaskId::new(type_id, generation), token));
            self.tasks.spawn(future);
        }
    }

    /// Apply every pending update published by commands or [`Updater`]s.
    pub fn sync_computes(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            if let Some(compute) = self.computes.get_mut(&msg.type_id) {
                compute.assign_box(msg.value);
            } else if let Some(state) = self.states.get_mut(&msg.type_id) {
                state.assign_box(msg.value);
            } else {
                log::warn!("update dropped for unregistered type {}", msg.type_name);
            }
        }
    }

    /// Number of spawned command tasks that have not been joined yet.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_set_mut(&mut self) -> &mut JoinSet<()> {
        &mut self.tasks
    }

    /// Cancel all outstanding tasks, drain them, and apply their final
    /// updates.
    pub async fn shutdown(&mut self) {
        for entry in self.commands.values_mut() {
            if let Some(handle) = entry.handle.take() {
                handle.cancel();
            }
        }
        while self.tasks.join_next().await.is_some() {
            self.sync_computes();
        }
        self.sync_computes();
    }

    fn build_snapshot(&self) -> CommandSnapshot {
        let mut states = StateSnapshot::new();
        for (type_id, state) in &self.states {
            if let Some(cloned) = state.snapshot() {
                states.insert_cloned(*type_id, cloned);
            }
        }
        let mut computes = ComputeSnapshot::new();
        for (type_id, compute) in &self.computes {
            if let Some(cloned) = compute.snapshot() {
                computes.insert_cloned(*type_id, cloned);
            }
        }
        CommandSnapshot::new(states, computes)
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::future::Future;
    use std::pin::Pin;

    use super::*;
    use crate::{assign_impl, state_assign_impl};

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct EchoInput {
        value: String,
    }

    impl State for EchoInput {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct EchoCache {
        value: Option<String>,
    }

    impl Compute for EchoCache {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Default)]
    struct EchoCommand;

    impl Command for EchoCommand {
        fn run(
            &self,
            snap: CommandSnapshot,
            updater: LatestOnlyUpdater,
            _cancel: CancellationToken,
        ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
            let input = snap.state::<EchoInput>().clone();
            Box::pin(async move {
                updater.set(EchoCache {
                    value: Some(input.value),
                });
            })
        }
    }

    /// Publishes only once its token is cancelled; used to pin down the
    /// latest-only delivery rule without sleeping.
    #[derive(Debug, Default)]
    struct WaitForCancelCommand;

    impl Command for WaitForCancelCommand {
        fn run(
            &self,
            snap: CommandSnapshot,
            updater: LatestOnlyUpdater,
            cancel: CancellationToken,
        ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
            let input = snap.state::<EchoInput>().clone();
            Box::pin(async move {
                cancel.cancelled().await;
                updater.set(EchoCache {
                    value: Some(input.value),
                });
            })
        }
    }

    async fn drain(ctx: &mut StateCtx) {
        while ctx.task_count() > 0 {
            if ctx.task_set_mut().join_next().await.is_some() {
                ctx.sync_computes();
            }
        }
        ctx.sync_computes();
    }

    #[test]
    fn state_roundtrip() {
        let mut ctx = StateCtx::new();
        ctx.add_state(EchoInput::default());

        ctx.update::<EchoInput>(|s| s.value = "hello".to_owned());
        assert_eq!(ctx.state::<EchoInput>().value, "hello");
    }

    #[test]
    fn missing_state_is_an_error() {
        let ctx = StateCtx::new();
        assert!(ctx.try_state::<EchoInput>().is_err());
        assert!(ctx.try_compute::<EchoCache>().is_err());
    }

    #[test]
    fn updater_routes_to_computes() {
        let mut ctx = StateCtx::new();
        ctx.record_compute(EchoCache::default());

        ctx.updater().set(EchoCache {
            value: Some("pushed".to_owned()),
        });
        ctx.sync_computes();

        assert_eq!(ctx.compute::<EchoCache>().value.as_deref(), Some("pushed"));
    }

    #[tokio::test]
    async fn command_reads_snapshot_and_updates_compute() {
        let mut ctx = StateCtx::new();
        ctx.add_state(EchoInput::default());
        ctx.record_compute(EchoCache::default());
        ctx.record_command(EchoCommand);

        ctx.update::<EchoInput>(|s| s.value = "echoed".to_owned());
        ctx.enqueue_command::<EchoCommand>();
        ctx.flush_commands();
        drain(&mut ctx).await;

        assert_eq!(ctx.compute::<EchoCache>().value.as_deref(), Some("echoed"));
    }

    #[tokio::test]
    async fn superseded_dispatch_publishes_nothing() {
        let mut ctx = StateCtx::new();
        ctx.add_state(EchoInput::default());
        ctx.record_compute(EchoCache::default());
        ctx.record_command(WaitForCancelCommand);

        ctx.update::<EchoInput>(|s| s.value = "first".to_owned());
        ctx.enqueue_command::<WaitForCancelCommand>();
        ctx.flush_commands();

        // Re-dispatch: cancels the first task, which then tries to publish
        // with a stale generation.
        ctx.update::<EchoInput>(|s| s.value = "second".to_owned());
        ctx.enqueue_command::<WaitForCancelCommand>();
        ctx.flush_commands();

        if ctx.task_set_mut().join_next().await.is_some() {
            ctx.sync_computes();
        }
        assert_eq!(ctx.compute::<EchoCache>().value, None);

        // Shutdown cancels the latest task; its publish is still current.
        ctx.shutdown().await;
        assert_eq!(ctx.compute::<EchoCache>().value.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn shutdown_drains_outstanding_tasks() {
        let mut ctx = StateCtx::new();
        ctx.add_state(EchoInput {
            value: "pending".to_owned(),
        });
        ctx.record_compute(EchoCache::default());
        ctx.record_command(WaitForCancelCommand);

        ctx.enqueue_command::<WaitForCancelCommand>();
        ctx.flush_commands();
        assert_eq!(ctx.task_count(), 1);

        ctx.shutdown().await;
        assert_eq!(ctx.task_count(), 0);
        assert_eq!(ctx.compute::<EchoCache>().value.as_deref(), Some("pending"));
    }
}
