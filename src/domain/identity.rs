use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an account holder (wallet owner, order owner, transaction party).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for AccountId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    /// Whether this role may read and list orders belonging to other accounts.
    pub fn can_view_all_orders(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may change order status and inspect reconciliation data.
    pub fn can_manage_orders(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The authenticated caller of a core operation.
///
/// Produced by the (external) authentication layer and passed explicitly into every
/// engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub account: AccountId,
    pub role: Role,
}

impl Requester {
    pub fn customer(account: impl Into<AccountId>) -> Self {
        Self {
            account: account.into(),
            role: Role::Customer,
        }
    }

    pub fn admin(account: impl Into<AccountId>) -> Self {
        Self {
            account: account.into(),
            role: Role::Admin,
        }
    }

    /// True if the requester owns `owner`'s resources or holds a role that sees everything.
    pub fn can_view(&self, owner: &AccountId) -> bool {
        self.role.can_view_all_orders() || &self.account == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.can_view_all_orders());
        assert!(Role::Admin.can_manage_orders());
        assert!(!Role::Customer.can_view_all_orders());
        assert!(!Role::Customer.can_manage_orders());
    }

    #[test]
    fn test_requester_visibility() {
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");

        assert!(Requester::customer("alice").can_view(&alice));
        assert!(!Requester::customer("alice").can_view(&bob));
        assert!(Requester::admin("root").can_view(&bob));
    }

    #[test]
    fn test_requester_deserialization() {
        let requester: Requester =
            serde_json::from_str(r#"{"account": "alice", "role": "admin"}"#).unwrap();
        assert_eq!(requester, Requester::admin("alice"));
        assert!(serde_json::from_str::<Requester>(r#"{"account": "a", "role": "root"}"#).is_err());
    }
}
