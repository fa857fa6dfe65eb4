use core::fmt;
use core::num::NonZeroU32;

/// Compact handle into the topology's entity arrays.
///
/// Stored as index+1 in a `NonZeroU32` so `Option<Id>` costs nothing
/// extra; a discretized cell never comes close to `u32::MAX` entities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Handle for the entity at 0-based `index`.
    pub fn from_index(index: u32) -> Self {
        match NonZeroU32::new(index.wrapping_add(1)) {
            Some(nz) => Self(nz),
            // Only reachable at index == u32::MAX.
            None => unreachable!("entity index overflow"),
        }
    }

    /// The 0-based index this handle was created with.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// `index()` widened to `usize` for slice lookups.
    pub fn idx(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Aliases naming which entity array an `Id` indexes into.
///
/// `NodeId`/`BranchId` address the electrical graph, `ThermId`/`LinkId`
/// the thermal graph.
pub type NodeId = Id;
pub type BranchId = Id;
pub type ThermId = Id;
pub type LinkId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_survives_the_round_trip() {
        for i in [0_u32, 1, 7, 4096, u32::MAX - 1] {
            assert_eq!(Id::from_index(i).index(), i);
            assert_eq!(Id::from_index(i).idx(), i as usize);
        }
    }

    #[test]
    fn optional_ids_are_free() {
        assert_eq!(
            core::mem::size_of::<Option<Id>>(),
            core::mem::size_of::<u32>()
        );
    }

    #[test]
    fn ids_order_by_index() {
        assert!(Id::from_index(3) < Id::from_index(4));
    }
}
