//! Callables that forward into a script engine.
//!
//! A [`ScriptBoundCallable`] looks like any other typed callable to native
//! code, but each invocation is routed through a [`ScriptSession`]: begin the
//! call, push the arguments in order, end the call and collect the return
//! value. The callable never owns the session; when the session is gone the
//! call quietly returns the default value.
//!
//! # Re-entrancy
//!
//! A session serves one call at a time. Calls from other threads wait for
//! the session lock. A call made on the thread that already holds the lock,
//! for example a native callback running inside [`ScriptSession::end_call`]
//! that calls back into the same session, fails with
//! [`ScriptError::SessionBusy`] and so returns the default value.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, Weak};

use callkit_core::{Dynamic, ParamList, QualifiedName, Signature, TypeAdapter};

use crate::callable::TypedCallable;
use crate::error::ScriptError;

/// Boundary to a script engine's calling convention.
///
/// The session is locked from `begin_call` through `take_return`. Nested
/// calls into the same session from inside that window are refused.
pub trait ScriptSession {
    /// Prepare a call to `name` in `namespace` with the given signature.
    fn begin_call(
        &mut self,
        name: &str,
        signature: &Signature,
        namespace: &[String],
    ) -> Result<(), ScriptError>;

    /// Push the next argument.
    fn push_argument(&mut self, value: Dynamic) -> Result<(), ScriptError>;

    /// Execute the prepared call.
    fn end_call(&mut self) -> Result<(), ScriptError>;

    /// Collect the return value of the last call.
    ///
    /// `sample` holds the default value of the declared return type, which
    /// tells the session what kind of storage the caller expects.
    fn take_return(&mut self, sample: &Dynamic) -> Option<Dynamic>;
}

/// Shared handle to a script session.
pub type SessionRef = Arc<Mutex<dyn ScriptSession + Send>>;

type WeakSession = Weak<Mutex<dyn ScriptSession + Send>>;

thread_local! {
    /// Sessions locked by a call on this thread.
    static ACTIVE_SESSIONS: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a session as in use by this thread until dropped.
struct ActiveCall {
    session: usize,
}

impl ActiveCall {
    fn enter(session: &SessionRef) -> Result<Self, ScriptError> {
        let session = Arc::as_ptr(session) as *const () as usize;
        ACTIVE_SESSIONS.with_borrow_mut(|active| {
            if active.contains(&session) {
                return Err(ScriptError::SessionBusy);
            }
            active.push(session);
            Ok(Self { session })
        })
    }
}

impl Drop for ActiveCall {
    fn drop(&mut self) {
        ACTIVE_SESSIONS.with_borrow_mut(|active| active.retain(|s| *s != self.session));
    }
}

/// Typed callable that invokes a script function.
pub struct ScriptBoundCallable<R, A> {
    session: WeakSession,
    function: QualifiedName,
    signature: Signature,
    _marker: PhantomData<fn(A) -> R>,
}

impl<R: TypeAdapter, A: ParamList> ScriptBoundCallable<R, A> {
    /// Bind to `function` in `session`.
    ///
    /// `function` may carry a namespace, as in `"Game::Ai::think"`.
    pub fn new(session: &SessionRef, function: impl Into<QualifiedName>) -> Self {
        Self {
            session: Arc::downgrade(session),
            function: function.into(),
            signature: Signature::of::<R, A>(),
            _marker: PhantomData,
        }
    }

    /// Script function this callable targets.
    pub fn function(&self) -> &QualifiedName {
        &self.function
    }

    /// Check if the session is still alive.
    pub fn is_attached(&self) -> bool {
        self.session.strong_count() > 0
    }

    /// Invoke, reporting why the call failed.
    pub fn try_invoke(&self, args: A) -> Result<R, ScriptError> {
        let session = self
            .session
            .upgrade()
            .ok_or(ScriptError::SessionUnavailable)?;
        let _active = ActiveCall::enter(&session)?;
        let mut session = session
            .lock()
            .map_err(|_| ScriptError::SessionUnavailable)?;

        session.begin_call(
            self.function.simple_name(),
            &self.signature,
            self.function.namespace_path(),
        )?;
        for value in args.into_storage() {
            session.push_argument(value)?;
        }
        session.end_call()?;

        if R::IS_VOID {
            return Ok(R::default_value());
        }
        let sample = R::default_value().into_storage();
        let value = session
            .take_return(&sample)
            .ok_or(ScriptError::MissingReturn)?;
        Ok(R::from_storage(&value)?)
    }
}

impl<R, A> Clone for ScriptBoundCallable<R, A> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            function: self.function.clone(),
            signature: self.signature.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R, A> fmt::Debug for ScriptBoundCallable<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptBoundCallable")
            .field("function", &self.function)
            .field("signature", &self.signature)
            .field("attached", &(self.session.strong_count() > 0))
            .finish()
    }
}

impl<R: TypeAdapter, A: ParamList> TypedCallable<R, A> for ScriptBoundCallable<R, A> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn invoke(&mut self, args: A) -> R {
        match self.try_invoke(args) {
            Ok(value) => value,
            Err(err) => {
                log::debug!(
                    "[ScriptBoundCallable::invoke] {} {}: {}",
                    self.function,
                    self.signature,
                    err
                );
                R::default_value()
            }
        }
    }

    fn clone_boxed(&self) -> Box<dyn TypedCallable<R, A>> {
        Box::new(self.clone())
    }
}
