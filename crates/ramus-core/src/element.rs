//! Element types storable at constant leaves.
//!
//! Trees are generic over their scalar element type. The `Element` trait
//! collects what the structural operations need from that type: cloning,
//! comparison, formatting, and a hashing hook that works for floats.

use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

/// A scalar type usable at the constant leaves of a tree.
///
/// `hash_element` exists because structural tree hashing must cover
/// constant values, and the float types do not implement [`Hash`].
/// Float implementations hash the IEEE bit pattern, so `-0.0` and `0.0`
/// hash differently while `x == y` on non-float elements still implies
/// equal hashes.
pub trait Element: Clone + PartialEq + Debug + Display {
    /// Feeds this value into a structural hasher.
    fn hash_element<H: Hasher>(&self, state: &mut H);
}

impl Element for f32 {
    fn hash_element<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.to_bits());
    }
}

impl Element for f64 {
    fn hash_element<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.to_bits());
    }
}

macro_rules! impl_element_via_hash {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                fn hash_element<H: Hasher>(&self, state: &mut H) {
                    Hash::hash(self, state);
                }
            }
        )*
    };
}

impl_element_via_hash!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, String);
