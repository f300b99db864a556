use serde::{Deserialize, Serialize};

use crate::MemberId;

/// Identity of whoever invokes a ledger operation.
///
/// Built by the request layer after authentication. The ledger trusts the
/// administrator flag as given and never inspects session state itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    member_id: MemberId,
    is_admin: bool,
}

impl Caller {
    #[must_use]
    pub const fn new(member_id: MemberId, is_admin: bool) -> Self {
        Self {
            member_id,
            is_admin,
        }
    }

    #[must_use]
    pub const fn admin(member_id: MemberId) -> Self {
        Self::new(member_id, true)
    }

    #[must_use]
    pub const fn member(member_id: MemberId) -> Self {
        Self::new(member_id, false)
    }

    #[must_use]
    pub const fn member_id(self) -> MemberId {
        self.member_id
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.is_admin
    }
}
