use serde::{Deserialize, Serialize};

use crate::material::MaterialLink;

use super::mask::MaskLink;

/// What crossing a surface means for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRole {
    /// Volume boundary; crossing it switches the current volume.
    Portal,
    /// Measurement surface.
    Sensitive,
    /// Material-only surface.
    Passive,
}

/// A bounded shape placed in a volume.
///
/// All references are indices or `(kind, index)` links into the collections
/// of a [`GeometryStore`](super::store::GeometryStore).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub transform: usize,
    pub mask: MaskLink,
    pub material: Option<MaterialLink>,
    pub volume: usize,
    pub role: SurfaceRole,
    /// Opaque identifier assigned by the geometry builder.
    pub id: u64,
}

impl Surface {
    #[must_use]
    pub fn new(transform: usize, mask: MaskLink, volume: usize, role: SurfaceRole) -> Self {
        Self {
            transform,
            mask,
            material: None,
            volume,
            role,
            id: 0,
        }
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialLink) -> Self {
        self.material = Some(material);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn is_portal(&self) -> bool {
        self.role == SurfaceRole::Portal
    }

    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.role == SurfaceRole::Sensitive
    }
}
