//! Success/failure continuations
//!
//! A [`SuccessFail`] carries two callbacks handed to an operation that
//! later reports its outcome through exactly one of them. [`success`]
//! starts a fluent chain where the failure branch is optional:
//!
//! ```
//! use app_utils::success;
//!
//! let mut saved = Vec::new();
//! let mut errors = Vec::new();
//! {
//!     let mut done = success(|id: u32| saved.push(id)).fail(|e: &str| errors.push(e.to_string()));
//!     done.succeed(7);
//!     done.failed("disk full");
//! }
//! assert_eq!(saved, vec![7]);
//! assert_eq!(errors, vec!["disk full"]);
//! ```

use std::marker::PhantomData;

type Callback<'a, T> = Box<dyn FnMut(T) + 'a>;

/// Pair of outcome callbacks
pub struct SuccessFail<'a, S, F> {
    on_success: Callback<'a, S>,
    on_fail: Callback<'a, F>,
}

impl<'a, S, F> SuccessFail<'a, S, F> {
    /// Pair `on_success` with `on_fail`
    pub fn new<OS, OF>(on_success: OS, on_fail: OF) -> Self
    where
        OS: FnMut(S) + 'a,
        OF: FnMut(F) + 'a,
    {
        Self { on_success: Box::new(on_success), on_fail: Box::new(on_fail) }
    }

    /// Report success
    pub fn succeed(&mut self, arg: S) {
        (self.on_success)(arg)
    }

    /// Report failure
    pub fn failed(&mut self, arg: F) {
        (self.on_fail)(arg)
    }
}

/// Continuation with only a success branch; failures are dropped
pub struct Success<'a, S, F> {
    on_success: Callback<'a, S>,
    _fail: PhantomData<fn(F)>,
}

impl<'a, S, F> Success<'a, S, F> {
    /// Wrap `on_success`
    pub fn new<OS>(on_success: OS) -> Self
    where
        OS: FnMut(S) + 'a,
    {
        Self { on_success: Box::new(on_success), _fail: PhantomData }
    }

    /// Invoke the success callback
    pub fn call(&mut self, arg: S) {
        (self.on_success)(arg)
    }

    /// Report success
    pub fn succeed(&mut self, arg: S) {
        self.call(arg)
    }

    /// Report failure; ignored
    pub fn failed(&mut self, _arg: F) {}

    /// Attach a failure branch
    pub fn fail<OF>(self, on_fail: OF) -> SuccessFail<'a, S, F>
    where
        OF: FnMut(F) + 'a,
    {
        SuccessFail { on_success: self.on_success, on_fail: Box::new(on_fail) }
    }
}

impl<'a, S, F: 'a> From<Success<'a, S, F>> for SuccessFail<'a, S, F> {
    fn from(success: Success<'a, S, F>) -> Self {
        success.fail(|_| {})
    }
}

/// Start a continuation from its success callback
pub fn success<'a, S, F, OS>(on_success: OS) -> Success<'a, S, F>
where
    OS: FnMut(S) + 'a,
{
    Success::new(on_success)
}
