// src/binder.rs

//! Idempotent trigger binding for rendered action lists
//!
//! A front-end re-renders lists of actionable package rows freely, and
//! overlapping re-renders must never stack a second handler on a row
//! that already has one. The binder keeps a registry keyed by element
//! instance: binding marks the instance, and the marker is checked
//! before binding again. The marker is per-instance, not per-logical
//! identifier; a full re-render that replaces every element calls
//! [`TriggerBinder::begin_render`], which invalidates the registry
//! wholesale and bumps the render generation.

use crate::op::{OperationKind, Target};
use std::collections::HashMap;
use tracing::trace;

/// Identity of one rendered element instance
pub type InstanceId = u64;

/// What firing a trigger should do: one operation on one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub kind: OperationKind,
    pub target: Target,
}

/// One actionable element as produced by a render pass
#[derive(Debug, Clone)]
pub struct RenderedAction {
    /// Per-instance identity; a re-render with new elements gets new ids
    pub instance: InstanceId,
    /// Stable logical identifier, e.g. "formula/wget"
    pub logical_id: String,
    pub descriptor: ActionDescriptor,
}

struct BoundTrigger {
    logical_id: String,
    descriptor: ActionDescriptor,
    handler: Box<dyn FnMut(&ActionDescriptor)>,
}

/// Registry guaranteeing at most one handler per element instance
#[derive(Default)]
pub struct TriggerBinder {
    generation: u64,
    bound: HashMap<InstanceId, BoundTrigger>,
}

impl TriggerBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh render: drop every binding and bump the generation
    pub fn begin_render(&mut self) {
        self.generation += 1;
        self.bound.clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Attach a handler to one element, unless it is already bound
    ///
    /// Returns true when the binding was newly created.
    pub fn bind<F>(&mut self, action: &RenderedAction, handler: F) -> bool
    where
        F: FnMut(&ActionDescriptor) + 'static,
    {
        if self.bound.contains_key(&action.instance) {
            trace!(instance = action.instance, "instance already bound, skipping");
            return false;
        }
        self.bound.insert(
            action.instance,
            BoundTrigger {
                logical_id: action.logical_id.clone(),
                descriptor: action.descriptor.clone(),
                handler: Box::new(handler),
            },
        );
        true
    }

    /// Bind a whole rendered list, returning how many were newly bound
    pub fn bind_all<F>(&mut self, actions: &[RenderedAction], mut make_handler: F) -> usize
    where
        F: FnMut(&RenderedAction) -> Box<dyn FnMut(&ActionDescriptor)>,
    {
        let mut newly_bound = 0;
        for action in actions {
            if self.bound.contains_key(&action.instance) {
                continue;
            }
            let handler = make_handler(action);
            self.bound.insert(
                action.instance,
                BoundTrigger {
                    logical_id: action.logical_id.clone(),
                    descriptor: action.descriptor.clone(),
                    handler,
                },
            );
            newly_bound += 1;
        }
        newly_bound
    }

    pub fn is_bound(&self, instance: InstanceId) -> bool {
        self.bound.contains_key(&instance)
    }

    /// Logical id a bound instance points at, if any
    pub fn logical_id(&self, instance: InstanceId) -> Option<&str> {
        self.bound.get(&instance).map(|t| t.logical_id.as_str())
    }

    /// Simulate one click on an element; invokes its handler exactly once
    ///
    /// Returns false for unbound (or invalidated) instances.
    pub fn fire(&mut self, instance: InstanceId) -> bool {
        match self.bound.get_mut(&instance) {
            Some(trigger) => {
                (trigger.handler)(&trigger.descriptor);
                true
            }
            None => false,
        }
    }
}
