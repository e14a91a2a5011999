use cardstock_core::OrgId;

/// Organization context for a request.
///
/// This is immutable and must be present for all domain routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrgContext {
    org_id: OrgId,
}

impl OrgContext {
    pub fn new(org_id: OrgId) -> Self {
        Self { org_id }
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }
}
