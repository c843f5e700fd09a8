//! Strongly typed identifier wrappers.
//!
//! Ids are the surrogate keys of the upstream store (`i64`), not dense
//! indices, so there is no `index()` helper here.  Dense indexing happens
//! inside `hr_spatial::graph`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Raw store key.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }

        impl From<$name> for $inner {
            #[inline(always)]
            fn from(id: $name) -> $inner {
                id.0
            }
        }
    };
}

typed_id! {
    /// Id of a routable road-network vertex (`ways_vertices_pgr.id`).
    pub struct VertexId(i64);
}

typed_id! {
    /// Id of a road-network segment, read from whichever column
    /// `SchemaConfig::segment_id_column` names.
    pub struct SegmentId(i64);
}

typed_id! {
    /// Id of a routable point: a bus hub or a college.
    pub struct PointId(i64);
}
