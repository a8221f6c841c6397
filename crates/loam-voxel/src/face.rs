//! The six cube faces of a chunk.

/// One of the six cardinal faces of a chunk.
///
/// The `repr(u8)` discriminant is the face index used by
/// [`FaceConnectivity`](crate::FaceConnectivity) bit addressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    /// −X face.
    NegX = 0,
    /// +X face.
    PosX = 1,
    /// −Y face.
    NegY = 2,
    /// +Y face.
    PosY = 3,
    /// −Z face.
    NegZ = 4,
    /// +Z face.
    PosZ = 5,
}

impl Face {
    /// All six faces in index order.
    pub const ALL: [Face; 6] = [
        Self::NegX,
        Self::PosX,
        Self::NegY,
        Self::PosY,
        Self::NegZ,
        Self::PosZ,
    ];

    /// Returns the face index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the face with the given index. Panics on `index >= 6`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    /// Returns the opposite face.
    pub fn opposite(self) -> Self {
        match self {
            Self::NegX => Self::PosX,
            Self::PosX => Self::NegX,
            Self::NegY => Self::PosY,
            Self::PosY => Self::NegY,
            Self::NegZ => Self::PosZ,
            Self::PosZ => Self::NegZ,
        }
    }

    /// Returns the unit chunk-grid offset through this face.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::NegX => (-1, 0, 0),
            Self::PosX => (1, 0, 0),
            Self::NegY => (0, -1, 0),
            Self::PosY => (0, 1, 0),
            Self::NegZ => (0, 0, -1),
            Self::PosZ => (0, 0, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trips() {
        for face in Face::ALL {
            assert_eq!(Face::from_index(face.index()), face);
        }
    }

    #[test]
    fn test_opposite_is_involution() {
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.opposite(), face);
        }
    }

    #[test]
    fn test_offset_negates_through_opposite() {
        for face in Face::ALL {
            let (dx, dy, dz) = face.offset();
            let (ox, oy, oz) = face.opposite().offset();
            assert_eq!((dx, dy, dz), (-ox, -oy, -oz));
        }
    }
}
