//! Type model: descriptors, the join over them, and change propagation.

mod descriptor;
mod lattice;
mod propagation;

pub use descriptor::{Origin, TypeDescriptor, UNKNOWN_TYPE};
pub use lattice::{TypeLattice, PRIMITIVES};
pub use propagation::{TypeListener, TypePropagator, TypeState};
