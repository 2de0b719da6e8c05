// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Context object passed to every global-function entry point.

use std::sync::Arc;

use crate::core::dispatch::RuntimeState;
use crate::core::error::{GlobalFnError, Result};
use crate::core::job::{AnnotatedSignatureChecker, JobBuilder, SignatureChecker};

use super::Session;

/// Holds the current session (if any) and the collaborators the job
/// builder needs. Replaces process-wide session state.
pub struct SessionContext {
    session: Option<Box<dyn Session>>,
    signature_checker: Arc<dyn SignatureChecker>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &self.runtime_state())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Context without a session.
    pub fn new() -> Self {
        SessionContextBuilder::new().build()
    }

    pub fn builder() -> SessionContextBuilder {
        SessionContextBuilder::new()
    }

    pub fn with_session<S: Session + 'static>(session: S) -> Self {
        SessionContextBuilder::new().with_session(session).build()
    }

    /// Snapshot of the tuple consulted by dispatch. Eager execution reads
    /// as disabled when there is no session.
    pub fn runtime_state(&self) -> RuntimeState {
        match &self.session {
            Some(session) => RuntimeState::new(
                true,
                session.current_execution_mode().is_eager(),
                session.is_initialized(),
            ),
            None => RuntimeState::new(false, false, false),
        }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    pub fn session_mut(&mut self) -> Result<&mut dyn Session> {
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(GlobalFnError::Session("no active session".into())),
        }
    }

    /// Install a session, returning the one it replaces.
    pub fn replace_session<S: Session + 'static>(
        &mut self,
        session: S,
    ) -> Option<Box<dyn Session>> {
        self.session.replace(Box::new(session))
    }

    pub fn take_session(&mut self) -> Option<Box<dyn Session>> {
        self.session.take()
    }

    pub fn signature_checker(&self) -> &Arc<dyn SignatureChecker> {
        &self.signature_checker
    }

    pub fn job_builder(&self) -> JobBuilder {
        JobBuilder::new(Arc::clone(&self.signature_checker))
    }
}

/// Builder for [`SessionContext`].
pub struct SessionContextBuilder {
    session: Option<Box<dyn Session>>,
    signature_checker: Option<Arc<dyn SignatureChecker>>,
}

impl Default for SessionContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContextBuilder {
    pub fn new() -> Self {
        Self {
            session: None,
            signature_checker: None,
        }
    }

    pub fn with_session<S: Session + 'static>(mut self, session: S) -> Self {
        self.session = Some(Box::new(session));
        self
    }

    pub fn with_session_box(mut self, session: Box<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_signature_checker<C: SignatureChecker + 'static>(mut self, checker: C) -> Self {
        self.signature_checker = Some(Arc::new(checker));
        self
    }

    pub fn with_signature_checker_arc(mut self, checker: Arc<dyn SignatureChecker>) -> Self {
        self.signature_checker = Some(checker);
        self
    }

    pub fn build(self) -> SessionContext {
        SessionContext {
            session: self.session,
            signature_checker: self
                .signature_checker
                .unwrap_or_else(|| Arc::new(AnnotatedSignatureChecker)),
        }
    }
}
