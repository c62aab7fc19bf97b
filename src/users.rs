//! Users

use serde::{Deserialize, Serialize};

/// A delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Recipient name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Street address
    pub line: String,

    /// City
    pub city: String,

    /// Postal code
    pub postal: String,
}

/// The last known (mock) signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// User id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Contact phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Saved addresses, default first
    pub addresses: Vec<Address>,
}

impl User {
    /// The address used to pre-fill checkout.
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.first()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn addresses_only_user_parses() -> TestResult {
        let user: User = serde_json::from_str(
            r#"{"addresses":[{"name":"Rahul","line":"Flat 12B","city":"Mumbai","postal":"400001"}]}"#,
        )?;

        let address = user.default_address().ok_or("missing address")?;

        assert_eq!(address.name, "Rahul");
        assert_eq!(address.phone, "");
        assert_eq!(user.id, None);

        Ok(())
    }

    #[test]
    fn default_address_is_none_without_addresses() {
        assert_eq!(User::default().default_address(), None);
    }
}
