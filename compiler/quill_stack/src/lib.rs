//! Stack growth for deeply nested template expressions.
//!
//! Both the expression parser and the evaluator recurse once per nesting
//! level. Template authors (or generated templates) can nest parentheses,
//! index chains and calls far deeper than a thread's default stack allows,
//! so every recursive entry point goes through [`ensure_sufficient_stack`].
//!
//! On native targets the stack is extended with `stacker`; on `wasm32` the
//! closure runs directly.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn eval_inner(&mut self, id: ExprId) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_kind(id))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `wasm32` has no stack switching; run the closure as is.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mimics a parenthesised expression nested `depth` times.
    fn nested_parens(depth: u32) -> u32 {
        ensure_sufficient_stack(|| {
            if depth == 0 {
                0
            } else {
                nested_parens(depth - 1) + 1
            }
        })
    }

    #[test]
    fn shallow_nesting() {
        assert_eq!(nested_parens(16), 16);
    }

    #[test]
    fn nesting_beyond_default_stack() {
        assert_eq!(nested_parens(200_000), 200_000);
    }

    #[test]
    fn propagates_errors() {
        fn fail_at(depth: u32) -> Result<u32, String> {
            ensure_sufficient_stack(|| {
                if depth == 0 {
                    Err("bottom".to_owned())
                } else {
                    fail_at(depth - 1).map(|n| n + 1)
                }
            })
        }
        assert_eq!(fail_at(1_000), Err("bottom".to_owned()));
    }
}
