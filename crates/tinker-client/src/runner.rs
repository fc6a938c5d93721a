//! Drives playground runs against a generation backend.
//!
//! One run covers every instance in the snapshot. Failures are terminal per
//! instance: the failing instance's active run id is always cleared and other
//! instances keep going.

use std::sync::Arc;

use futures::StreamExt;
use tinker_store::{PlaygroundStore, transitions::InstancePatch};
use tinker_types::{ChunkEvent, InstanceId};
use tracing::{debug, warn};

use crate::abort::AbortSignal;
use crate::accumulator::{ExampleId, InstanceResponse, ResponseKey, ResponseMap, apply_chunk};
use crate::backend::{ChunkStream, Generation, GenerationBackend};
use crate::errors::PlaygroundError;
use crate::request::build_request;

pub struct RunDriver {
    store: Arc<PlaygroundStore>,
    backend: Arc<dyn GenerationBackend>,
}

impl RunDriver {
    pub fn new(store: Arc<PlaygroundStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { store, backend }
    }

    /// Run every instance against the backend for one example.
    ///
    /// Assigns fresh run ids through the store, then drives each instance to a
    /// terminal state. Returns the accumulated responses, or
    /// [`PlaygroundError::Aborted`] once the signal fires — after which no
    /// further store mutation is performed.
    pub async fn run_all(
        &self,
        example: ExampleId,
        signal: &AbortSignal,
    ) -> Result<ResponseMap, PlaygroundError> {
        if signal.is_aborted() {
            return Err(PlaygroundError::Aborted);
        }

        let state = self.store.run_instances();
        debug!(instances = state.instances.len(), streaming = state.streaming, "starting run");

        let mut responses = ResponseMap::new();
        for instance in &state.instances {
            if signal.is_aborted() {
                return Err(PlaygroundError::Aborted);
            }
            let key = (instance.id, example);

            let request = match build_request(&state, instance) {
                Ok(request) => request,
                Err(err) => {
                    warn!(instance = instance.id.0, error = %err, "failed to build request");
                    responses = self.fail_instance(key, responses, &err);
                    continue;
                }
            };

            if state.streaming {
                match self.backend.stream(request).await {
                    Ok(stream) => {
                        responses = self.drive_stream(key, stream, responses, signal).await?;
                    }
                    Err(err) => {
                        warn!(instance = instance.id.0, error = %err, "stream request failed");
                        responses = self.fail_instance(key, responses, &err);
                    }
                }
            } else {
                match self.backend.complete(request).await {
                    Ok(generation) => {
                        responses = self.finish_single_shot(key, responses, generation);
                    }
                    Err(err) => {
                        warn!(instance = instance.id.0, error = %err, "completion request failed");
                        responses = self.fail_instance(key, responses, &err);
                    }
                }
            }
        }

        Ok(responses)
    }

    /// Consume one instance's chunk stream, applying chunks in arrival order.
    async fn drive_stream(
        &self,
        key: ResponseKey,
        mut stream: ChunkStream,
        mut responses: ResponseMap,
        signal: &AbortSignal,
    ) -> Result<ResponseMap, PlaygroundError> {
        let instance_id = key.0;
        while let Some(item) = stream.next().await {
            if signal.is_aborted() {
                return Err(PlaygroundError::Aborted);
            }
            match item {
                Ok(chunk) => {
                    responses = apply_chunk(&responses, key, &chunk);
                    match &chunk {
                        ChunkEvent::Finished { .. } => {
                            self.finalize(instance_id, responses.get(&key));
                            return Ok(responses);
                        }
                        ChunkEvent::Error { message } => {
                            warn!(instance = instance_id.0, error = %message, "run errored");
                            self.store.mark_complete(instance_id);
                            return Ok(responses);
                        }
                        ChunkEvent::TextDelta { .. } | ChunkEvent::ToolCallDelta { .. } => {}
                    }
                }
                Err(err) => {
                    responses = self.fail_instance(key, responses, &err);
                    return Ok(responses);
                }
            }
        }

        // Stream ended without a terminal chunk; clear the run anyway so the
        // instance does not hang in a running state.
        warn!(instance = instance_id.0, "stream ended without terminal chunk");
        self.store.mark_complete(instance_id);
        Ok(responses)
    }

    /// Fold a single-shot generation through the same chunk path the
    /// streaming case uses, then finalize.
    fn finish_single_shot(
        &self,
        key: ResponseKey,
        responses: ResponseMap,
        generation: Generation,
    ) -> ResponseMap {
        let mut responses = apply_chunk(&responses, key, &ChunkEvent::text(generation.content));
        for call in generation.tool_calls {
            responses = apply_chunk(
                &responses,
                key,
                &ChunkEvent::ToolCallDelta {
                    id: call.id,
                    function_name: Some(call.name),
                    arguments: call.arguments,
                },
            );
        }
        responses = apply_chunk(
            &responses,
            key,
            &ChunkEvent::Finished {
                span_id: generation.span_id,
                trace_id: None,
                experiment_run_id: None,
                usage: generation.usage,
                latency_ms: None,
            },
        );
        self.finalize(key.0, responses.get(&key));
        responses
    }

    /// Apply the accumulated output/span to the instance and clear its run.
    fn finalize(&self, instance_id: InstanceId, response: Option<&InstanceResponse>) {
        let mut patch = InstancePatch::default();
        if let Some(response) = response {
            if !response.content.is_empty() {
                patch.output = Some(response.content.clone());
            }
            patch.span_id = response.span_id.clone();
        }
        self.store.update_instance(instance_id, &patch);
        self.store.mark_complete(instance_id);
    }

    /// Record the error against the example and clear the instance's run id
    /// so the UI never hangs in a running state. Other instances are not
    /// rolled back.
    fn fail_instance(
        &self,
        key: ResponseKey,
        responses: ResponseMap,
        err: &PlaygroundError,
    ) -> ResponseMap {
        let responses = apply_chunk(&responses, key, &ChunkEvent::error(err.to_string()));
        self.store.mark_complete(key.0);
        responses
    }
}
