//! The operator registry.
//!
//! An [`OperatorSet`] is a value-level closed world: two ordered tables of
//! named pure functions, fixed at construction. Trees store 1-based indices
//! into these tables; evaluation dispatches through plain function
//! pointers, so there is no per-node virtual call.

/// A named unary operator.
#[derive(Clone, Debug)]
pub struct UnaryOp<T> {
    name: String,
    func: fn(T) -> T,
}

impl<T> UnaryOp<T> {
    /// The registered name, used by rendering.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the operator.
    #[inline]
    pub fn call(&self, x: T) -> T {
        (self.func)(x)
    }
}

/// A named binary operator.
#[derive(Clone, Debug)]
pub struct BinaryOp<T> {
    name: String,
    func: fn(T, T) -> T,
}

impl<T> BinaryOp<T> {
    /// The registered name, used by rendering.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the operator.
    #[inline]
    pub fn call(&self, x: T, y: T) -> T {
        (self.func)(x, y)
    }
}

/// An immutable, ordered registry of unary and binary operators over
/// element type `T`.
///
/// Arity is implicit in which table an operator was registered into; the
/// same function may appear in both tables (or twice in one) and the
/// entries are distinct as far as trees are concerned. Trees reference a
/// registry by convention only — swapping registries between construction
/// and evaluation silently reinterprets every operator index.
#[derive(Clone, Debug)]
pub struct OperatorSet<T> {
    unary: Vec<UnaryOp<T>>,
    binary: Vec<BinaryOp<T>>,
    enable_autodiff: bool,
}

impl<T> Default for OperatorSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OperatorSet<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unary: Vec::new(),
            binary: Vec::new(),
            enable_autodiff: false,
        }
    }

    /// Appends a unary operator; its index is the 1-based position in
    /// registration order.
    #[must_use]
    pub fn with_unary(mut self, name: impl Into<String>, func: fn(T) -> T) -> Self {
        self.unary.push(UnaryOp {
            name: name.into(),
            func,
        });
        self
    }

    /// Appends a binary operator; its index is the 1-based position in
    /// registration order.
    #[must_use]
    pub fn with_binary(mut self, name: impl Into<String>, func: fn(T, T) -> T) -> Self {
        self.binary.push(BinaryOp {
            name: name.into(),
            func,
        });
        self
    }

    /// Marks that autodiff-capable derivatives are co-registered for these
    /// operators. Preserved for external derivative collaborators; the
    /// evaluators ignore it.
    #[must_use]
    pub fn with_autodiff(mut self, enable: bool) -> Self {
        self.enable_autodiff = enable;
        self
    }

    /// Whether autodiff-capable derivatives are co-registered.
    #[must_use]
    pub fn autodiff_enabled(&self) -> bool {
        self.enable_autodiff
    }

    /// Looks up a unary operator by 1-based index.
    ///
    /// # Panics
    ///
    /// Panics if the index is 0 or past the unary table.
    #[must_use]
    pub fn unary(&self, op: u16) -> &UnaryOp<T> {
        self.get_unary(op)
            .unwrap_or_else(|| panic!("unary operator index {op} out of range"))
    }

    /// Looks up a binary operator by 1-based index.
    ///
    /// # Panics
    ///
    /// Panics if the index is 0 or past the binary table.
    #[must_use]
    pub fn binary(&self, op: u16) -> &BinaryOp<T> {
        self.get_binary(op)
            .unwrap_or_else(|| panic!("binary operator index {op} out of range"))
    }

    /// Fallible unary lookup by 1-based index.
    #[must_use]
    pub fn get_unary(&self, op: u16) -> Option<&UnaryOp<T>> {
        op.checked_sub(1)
            .and_then(|i| self.unary.get(usize::from(i)))
    }

    /// Fallible binary lookup by 1-based index.
    #[must_use]
    pub fn get_binary(&self, op: u16) -> Option<&BinaryOp<T>> {
        op.checked_sub(1)
            .and_then(|i| self.binary.get(usize::from(i)))
    }

    /// Number of registered unary operators.
    #[must_use]
    pub fn unary_count(&self) -> usize {
        self.unary.len()
    }

    /// Number of registered binary operators.
    #[must_use]
    pub fn binary_count(&self) -> usize {
        self.binary.len()
    }
}
