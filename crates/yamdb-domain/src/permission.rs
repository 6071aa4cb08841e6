//! Capability-based permission model.
//!
//! Every actor carries a [`CapabilitySet`] derived from its role and, for
//! authored content, from its relation to the resource. Use cases declare the
//! capability an action needs and call [`authorize`].

use thiserror::Error;

use crate::role::Role;

/// An action an actor may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read public resources (catalog, titles, reviews, comments).
    Read,
    /// Create reviews and comments.
    Publish,
    /// Modify or delete a specific review or comment.
    EditContent,
    /// Read and update one's own profile.
    EditProfile,
    /// Create, change and delete categories, genres and titles.
    ManageCatalog,
    /// Full access to the user resource.
    ManageUsers,
}

impl Capability {
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A small set of [`Capability`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn with(self, cap: Capability) -> Self {
        Self(self.0 | cap.bit())
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Capabilities granted by role alone. `None` is the anonymous actor.
    pub fn for_role(role: Option<Role>) -> Self {
        let anonymous = Self::empty().with(Capability::Read);
        let Some(role) = role else {
            return anonymous;
        };
        let user = anonymous
            .with(Capability::Publish)
            .with(Capability::EditProfile);
        match role {
            Role::User => user,
            Role::Moderator => user.with(Capability::EditContent),
            Role::Admin => user
                .with(Capability::EditContent)
                .with(Capability::ManageCatalog)
                .with(Capability::ManageUsers),
        }
    }

    /// Extend with what authorship of a specific piece of content grants.
    ///
    /// Only actors that may publish gain `EditContent` through authorship.
    pub fn on_content(self, is_author: bool) -> Self {
        if is_author && self.contains(Capability::Publish) {
            self.with(Capability::EditContent)
        } else {
            self
        }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denied {
    /// The actor is anonymous and must authenticate first.
    #[error("authentication required")]
    Unauthenticated,
    /// The actor is authenticated but lacks the capability.
    #[error("permission denied")]
    Forbidden,
}

/// Check that `granted` contains `required`.
///
/// `authenticated` decides between [`Denied::Unauthenticated`] and
/// [`Denied::Forbidden`] when the capability is missing.
pub fn authorize(
    granted: CapabilitySet,
    required: Capability,
    authenticated: bool,
) -> Result<(), Denied> {
    if granted.contains(required) {
        Ok(())
    } else if authenticated {
        Err(Denied::Forbidden)
    } else {
        Err(Denied::Unauthenticated)
    }
}
