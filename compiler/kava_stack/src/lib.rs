//! Stack growth for the recursive pattern passes.
//!
//! Record patterns nest without a language-imposed bound
//! (`Box(Box(Box(...)))`), and every pattern pass (binding collection,
//! resolution, flow analysis, branch planning) walks that nesting by
//! recursive descent. Wrapping each recursive step in
//! [`ensure_sufficient_stack`] grows the native stack on demand instead of
//! relying on the thread's initial stack size.
//!
//! On `wasm32` the wrapper is a plain call.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (1MB).
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if fewer than [`RED_ZONE`] bytes remain.
///
/// ```text
/// fn walk(&mut self, id: PatternId) {
///     ensure_sufficient_stack(|| {
///         for child in self.children(id) {
///             self.walk(child);
///         }
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
