//! Index types for mesh elements.
//!
//! Vertices, faces, edges and UVs are addressed by small typed wrappers so a
//! face index can never be handed to a vertex query by mistake. Indices are
//! contiguous (`0..count`) and stable for the lifetime of a mesh; UV
//! operations never renumber faces, vertices or edges.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// Trait for integer types usable as element indices.
///
/// Implemented for `u32`. The all-ones value is reserved as the invalid
/// sentinel.
pub trait MeshIndex:
    Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static
{
    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// # Panics
    /// Panics in debug builds if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v < <$ty>::MAX as usize,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u32);

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe index of an undirected 3D edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

/// A type-safe index of a UV coordinate within one UV set.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct UvId<I: MeshIndex = u32>(I);

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

            /// Get the index as `usize`.
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

        impl<I: MeshIndex> Display for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
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
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");
impl_index_type!(UvId, "UV");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_id() {
        let f: FaceId = FaceId::new(42);
        assert_eq!(f.index(), 42);
        assert!(f.is_valid());
        assert!(!FaceId::<u32>::invalid().is_valid());
        assert!(!FaceId::<u32>::default().is_valid());
    }

    #[test]
    fn test_ordering_follows_index() {
        let mut faces: Vec<FaceId> = vec![FaceId::new(3), FaceId::new(0), FaceId::new(2)];
        faces.sort();
        let raw: Vec<usize> = faces.iter().map(|f| f.index()).collect();
        assert_eq!(raw, vec![0, 2, 3]);
    }

    #[test]
    fn test_formatting() {
        let f: FaceId = FaceId::new(12);
        assert_eq!(format!("{:?}", f), "F(12)");
        assert_eq!(format!("{}", f), "12");
        assert_eq!(format!("{:?}", EdgeId::<u32>::invalid()), "E(INVALID)");
    }
}
