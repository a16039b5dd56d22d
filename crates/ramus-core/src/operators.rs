//! Builtin operator bodies for floating-point element types.
//!
//! The `safe_*` family keeps evaluation total on the reals: domain
//! failures produce NaN instead of panicking, and the completeness flag
//! of the evaluator reports them. Rendering rewrites the `safe_` prefix
//! away, so `safe_log` prints as `log`.

use num_traits::Float;

use crate::registry::OperatorSet;

/// Natural logarithm; NaN outside `x > 0`.
pub fn safe_log<T: Float>(x: T) -> T {
    if x > T::zero() {
        x.ln()
    } else {
        T::nan()
    }
}

/// Base-2 logarithm; NaN outside `x > 0`.
pub fn safe_log2<T: Float>(x: T) -> T {
    if x > T::zero() {
        x.log2()
    } else {
        T::nan()
    }
}

/// Base-10 logarithm; NaN outside `x > 0`.
pub fn safe_log10<T: Float>(x: T) -> T {
    if x > T::zero() {
        x.log10()
    } else {
        T::nan()
    }
}

/// `ln(1 + x)`; NaN outside `x > -1`.
pub fn safe_log1p<T: Float>(x: T) -> T {
    if x > -T::one() {
        x.ln_1p()
    } else {
        T::nan()
    }
}

/// Square root; NaN for negative input.
pub fn safe_sqrt<T: Float>(x: T) -> T {
    if x >= T::zero() {
        x.sqrt()
    } else {
        T::nan()
    }
}

/// Inverse hyperbolic cosine; NaN outside `x >= 1`.
pub fn safe_acosh<T: Float>(x: T) -> T {
    if x >= T::one() {
        x.acosh()
    } else {
        T::nan()
    }
}

/// Power with a total real-valued contract: `0^y` for negative `y` is NaN
/// rather than infinite, and a negative base with a fractional exponent is
/// NaN as `powf` already makes it.
pub fn safe_pow<T: Float>(x: T, y: T) -> T {
    if x == T::zero() && y < T::zero() {
        T::nan()
    } else {
        x.powf(y)
    }
}

/// Addition.
pub fn add<T: Float>(a: T, b: T) -> T {
    a + b
}

/// Subtraction.
pub fn sub<T: Float>(a: T, b: T) -> T {
    a - b
}

/// Multiplication.
pub fn mul<T: Float>(a: T, b: T) -> T {
    a * b
}

/// Division.
pub fn div<T: Float>(a: T, b: T) -> T {
    a / b
}

/// Negation.
pub fn neg<T: Float>(x: T) -> T {
    -x
}

/// Cosine.
pub fn cos<T: Float>(x: T) -> T {
    x.cos()
}

/// Sine.
pub fn sin<T: Float>(x: T) -> T {
    x.sin()
}

/// Natural exponential.
pub fn exp<T: Float>(x: T) -> T {
    x.exp()
}

/// Absolute value.
pub fn abs<T: Float>(x: T) -> T {
    x.abs()
}

impl<T: Float> OperatorSet<T> {
    /// The four arithmetic binary operators `+ - * /`, in that order.
    #[must_use]
    pub fn arithmetic() -> Self {
        Self::new()
            .with_binary("+", add)
            .with_binary("-", sub)
            .with_binary("*", mul)
            .with_binary("/", div)
    }
}
