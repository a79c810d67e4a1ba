use serde::Deserialize;

/// Capability grants held by the host process. Anything not granted
/// explicitly is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Grants {
    pub read_phone_state: bool,
    pub fine_location: bool,
    pub coarse_location: bool,
}

impl Grants {
    pub fn all() -> Self {
        Self {
            read_phone_state: true,
            fine_location: true,
            coarse_location: true,
        }
    }

    /// Phone state access plus either kind of location access.
    pub fn allows_collection(&self) -> bool {
        self.read_phone_state && (self.fine_location || self.coarse_location)
    }
}

pub trait PermissionGate: Send + Sync {
    fn grants(&self) -> Grants;
}

/// Grants fixed at startup, e.g. from configuration.
impl PermissionGate for Grants {
    fn grants(&self) -> Grants {
        *self
    }
}
