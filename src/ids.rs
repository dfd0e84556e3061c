//! Dense, monotonic numeric handles for the graph and dataflow arenas.
//!
//! The data model is arena-owned (see `program.rs`): nodes, variables and
//! bindings never move once created and are never destroyed before the
//! `Program` itself, so plain `usize` handles are enough to let bindings
//! reference each other cyclically without any reference counting.

use std::fmt;

macro_rules! dense_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index)
            }

            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", stringify!($name).chars().next().unwrap(), self.0)
            }
        }
    };
}

dense_id!(NodeId);
dense_id!(VariableId);
dense_id!(BindingId);
