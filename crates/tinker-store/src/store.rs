//! Observable store wrapper: serialized apply, atomic snapshot publish.

use std::sync::Mutex;

use tinker_types::{IdSource, InstanceId, InvocationParameterInput};
use tokio::sync::watch;

use crate::catalog::ParameterSpec;
use crate::defaults::SavedModelConfigs;
use crate::state::{OperationType, PlaygroundState, TemplateLanguage};
use crate::transitions::{self, InstancePatch, ModelConfigPatch};

/// Holds the canonical snapshot and notifies subscribers on replacement.
///
/// Applies are serialized: one operation's computed snapshot fully replaces
/// the prior snapshot before the next operation observes it. Readers only
/// ever see whole snapshots.
#[derive(Debug)]
pub struct PlaygroundStore {
    ids: IdSource,
    apply_lock: Mutex<()>,
    tx: watch::Sender<PlaygroundState>,
}

impl PlaygroundStore {
    pub fn new(initial: PlaygroundState, ids: IdSource) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            ids,
            apply_lock: Mutex::new(()),
            tx,
        }
    }

    /// Store seeded with a single default instance.
    pub fn with_default_instance(ids: IdSource, saved: &SavedModelConfigs) -> Self {
        let initial = PlaygroundState::with_default_instance(&ids, saved);
        Self::new(initial, ids)
    }

    pub fn ids(&self) -> &IdSource {
        &self.ids
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> PlaygroundState {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every published snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<PlaygroundState> {
        self.tx.subscribe()
    }

    /// Compute a new snapshot from the current one and publish it atomically.
    pub fn apply<F>(&self, transition: F) -> PlaygroundState
    where
        F: FnOnce(&PlaygroundState, &IdSource) -> PlaygroundState,
    {
        let _guard = self.apply_lock.lock().expect("store apply lock poisoned");
        let current = self.tx.borrow().clone();
        let next = transition(&current, &self.ids);
        self.tx.send_replace(next.clone());
        next
    }

    pub fn set_operation_type(&self, operation_type: OperationType) -> PlaygroundState {
        self.apply(|state, ids| transitions::set_operation_type(state, operation_type, ids))
    }

    pub fn add_instance(&self) -> PlaygroundState {
        self.apply(transitions::add_instance)
    }

    pub fn delete_instance(&self, id: InstanceId) -> PlaygroundState {
        self.apply(|state, _| transitions::delete_instance(state, id))
    }

    pub fn update_model(
        &self,
        instance_id: InstanceId,
        patch: &ModelConfigPatch,
        saved: &SavedModelConfigs,
    ) -> PlaygroundState {
        self.apply(|state, _| transitions::update_model(state, instance_id, patch, saved))
    }

    pub fn add_message(&self, instance_id: InstanceId) -> PlaygroundState {
        self.apply(|state, ids| transitions::add_message(state, instance_id, ids))
    }

    pub fn update_instance(&self, instance_id: InstanceId, patch: &InstancePatch) -> PlaygroundState {
        self.apply(|state, _| transitions::update_instance(state, instance_id, patch))
    }

    pub fn run_instances(&self) -> PlaygroundState {
        self.apply(transitions::run_instances)
    }

    pub fn mark_complete(&self, instance_id: InstanceId) -> PlaygroundState {
        self.apply(|state, _| transitions::mark_complete(state, instance_id))
    }

    pub fn set_template_language(&self, language: TemplateLanguage) -> PlaygroundState {
        self.apply(|state, _| transitions::set_template_language(state, language))
    }

    pub fn set_streaming(&self, streaming: bool) -> PlaygroundState {
        self.apply(|state, _| transitions::set_streaming(state, streaming))
    }

    pub fn set_variable_value(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> PlaygroundState {
        let (name, value) = (name.into(), value.into());
        self.apply(|state, _| transitions::set_variable_value(state, name, value))
    }

    pub fn set_experiment_id(&self, experiment_id: Option<String>) -> PlaygroundState {
        self.apply(|state, _| transitions::set_experiment_id(state, experiment_id))
    }

    pub fn filter_invocation_parameters(
        &self,
        instance_id: InstanceId,
        supported: &[ParameterSpec],
    ) -> PlaygroundState {
        self.apply(|state, _| {
            transitions::filter_invocation_parameters(state, instance_id, supported)
        })
    }

    pub fn upsert_invocation_parameter(
        &self,
        instance_id: InstanceId,
        param: InvocationParameterInput,
    ) -> PlaygroundState {
        self.apply(|state, _| transitions::upsert_invocation_parameter(state, instance_id, param))
    }

    pub fn delete_invocation_parameter(
        &self,
        instance_id: InstanceId,
        invocation_name: &str,
    ) -> PlaygroundState {
        self.apply(|state, _| {
            transitions::delete_invocation_parameter(state, instance_id, invocation_name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> PlaygroundStore {
        PlaygroundStore::with_default_instance(IdSource::new(), &SavedModelConfigs::default())
    }

    #[test]
    fn snapshot_reflects_latest_apply() {
        let store = seeded_store();
        assert_eq!(store.snapshot().instances.len(), 1);
        store.add_instance();
        assert_eq!(store.snapshot().instances.len(), 2);
    }

    #[test]
    fn apply_returns_the_published_snapshot() {
        let store = seeded_store();
        let published = store.set_streaming(false);
        assert_eq!(published, store.snapshot());
        assert!(!published.streaming);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn subscribers_observe_snapshot_replacements() {
        let store = seeded_store();
        let mut rx = store.subscribe();
        store.set_streaming(false);
        rx.changed().await.expect("store still alive");
        assert!(!rx.borrow().streaming);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn subscriber_sees_whole_snapshot_not_partial_updates() {
        let store = seeded_store();
        let mut rx = store.subscribe();
        store.add_instance();
        store.run_instances();
        // Watch semantics: the receiver observes the latest full snapshot.
        rx.changed().await.expect("store still alive");
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.instances.len(), 2);
        assert!(state.instances.iter().all(|i| i.active_run_id.is_some()));
    }
}
