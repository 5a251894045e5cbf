//! Scoped suspension of preemption.

use critical_section::RestoreState;

/// Holds the critical section for as long as it lives.
///
/// Interrupts (or whatever the linked `critical-section` implementation
/// suspends) stay off until the guard is dropped, which also happens while
/// unwinding. Guards nest; the innermost one to drop restores the state the
/// outermost one found.
#[must_use = "preemption is restored as soon as the guard is dropped"]
pub struct Exclusive {
    restore: RestoreState,
}

impl Exclusive {
    pub fn acquire() -> Self {
        // SAFETY: the guard is the only way to release, and release happens
        // exactly once in `Drop`, so acquire/release pairs stay balanced and
        // nested in LIFO order.
        let restore = unsafe { critical_section::acquire() };
        Self { restore }
    }

    /// Run `f` with preemption suspended.
    pub fn run<R>(f: impl FnOnce() -> R) -> R {
        let _guard = Self::acquire();
        f()
    }
}

impl Drop for Exclusive {
    fn drop(&mut self) {
        // SAFETY: `restore` came from the matching `acquire` in `Exclusive::acquire`.
        unsafe { critical_section::release(self.restore) }
    }
}
