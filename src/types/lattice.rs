//! Stateless operations over sets of type descriptors.

use super::descriptor::TypeDescriptor;
use std::collections::HashSet;

/// Type names treated as primitives (when carrying no pointer/array adjustment).
pub const PRIMITIVES: &[&str] = &[
    "boolean", "bool", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Classification and join over [`TypeDescriptor`]s.
///
/// No inheritance information is available at this layer, so the join is
/// structural:
/// 1. empty set → no common type
/// 2. one distinct member → that member
/// 3. members that only differ in their modifier → the unqualified type
/// 4. anything else → [`TypeDescriptor::unknown`]
///
/// The result never depends on iteration order.
pub struct TypeLattice;

impl TypeLattice {
    /// The unknown sentinel
    pub fn unknown() -> TypeDescriptor {
        TypeDescriptor::unknown()
    }

    pub fn is_unknown(ty: &TypeDescriptor) -> bool {
        ty.is_unknown()
    }

    pub fn is_primitive(ty: &TypeDescriptor) -> bool {
        !ty.has_adjustment() && PRIMITIVES.contains(&ty.name.as_str())
    }

    /// Whether every member of `types` is primitive (true for an empty set).
    pub fn all_primitive<'a>(types: impl IntoIterator<Item = &'a TypeDescriptor>) -> bool {
        types.into_iter().all(Self::is_primitive)
    }

    /// The join of `candidates`.
    pub fn common_type(candidates: &HashSet<TypeDescriptor>) -> Option<TypeDescriptor> {
        let mut iter = candidates.iter();
        let first = iter.next()?;

        if candidates.len() == 1 {
            return Some(first.clone());
        }

        let same_shape = candidates
            .iter()
            .all(|t| t.name == first.name && t.adjustment == first.adjustment);
        if same_shape {
            return Some(
                TypeDescriptor::new(first.name.clone(), first.adjustment.clone(), "")
                    .with_origin(first.origin),
            );
        }

        Some(Self::unknown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(types: &[&str]) -> HashSet<TypeDescriptor> {
        types.iter().map(|t| TypeDescriptor::parse(t)).collect()
    }

    #[test]
    fn test_primitives() {
        assert!(TypeLattice::is_primitive(&TypeDescriptor::parse("int")));
        assert!(TypeLattice::is_primitive(&TypeDescriptor::parse("const double")));
        assert!(!TypeLattice::is_primitive(&TypeDescriptor::parse("int*")));
        assert!(!TypeLattice::is_primitive(&TypeDescriptor::parse("String")));
        assert!(TypeLattice::all_primitive(&set(&[])));
    }

    #[test]
    fn test_common_type_trivial() {
        assert_eq!(TypeLattice::common_type(&set(&[])), None);
        assert_eq!(
            TypeLattice::common_type(&set(&["Foo"])),
            Some(TypeDescriptor::parse("Foo"))
        );
    }

    #[test]
    fn test_common_type_drops_modifier() {
        let joined = TypeLattice::common_type(&set(&["const char*", "char*"])).unwrap();
        assert_eq!(joined, TypeDescriptor::parse("char*"));
    }

    #[test]
    fn test_common_type_unrelated_is_unknown() {
        let joined = TypeLattice::common_type(&set(&["Foo", "Bar"])).unwrap();
        assert!(joined.is_unknown());

        let joined = TypeLattice::common_type(&set(&["int", "int*"])).unwrap();
        assert!(joined.is_unknown());
    }
}
