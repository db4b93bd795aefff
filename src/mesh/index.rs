//! Index types for mesh elements.
//!
//! Half-edge navigation is stored as flat arrays; entries are addressed through
//! type-safe wrappers so a face index can never be used where a half-edge index
//! is expected. The "no such element" sentinel (a boundary twin, for example)
//! is the reserved `INVALID` value of the underlying integer, never a null
//! reference.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types that can back mesh indices.
///
/// Implemented for `u32` (the default) and `u64` for very large meshes.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize, returning `None` if the value does not fit.
    fn try_from_usize(v: usize) -> Option<Self>;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Convert from usize.
    ///
    /// # Panics
    /// Panics in debug builds if the value is too large for this index type.
    #[inline]
    fn from_usize(v: usize) -> Self {
        debug_assert!(
            Self::try_from_usize(v).is_some(),
            "index {} too large for index type",
            v
        );
        Self::try_from_usize(v).unwrap_or(Self::INVALID)
    }

    /// Check if this is a valid (non-sentinel) index.
    #[inline]
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl MeshIndex for u32 {
    const MAX: Self = u32::MAX - 1;
    const INVALID: Self = u32::MAX;

    #[inline]
    fn try_from_usize(v: usize) -> Option<Self> {
        u32::try_from(v).ok().filter(|&x| x <= <Self as MeshIndex>::MAX)
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl MeshIndex for u64 {
    const MAX: Self = u64::MAX - 1;
    const INVALID: Self = u64::MAX;

    #[inline]
    fn try_from_usize(v: usize) -> Option<Self> {
        Some(v as u64).filter(|&x| x <= <Self as MeshIndex>::MAX)
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

/// A type-safe vertex index into the original (uncut) mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe edge index (for full edges, not half-edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");
