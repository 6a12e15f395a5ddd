use rapport_core::{Contact, Coordinate, PostalAddress};

/// An unlocated address with a street and city.
pub fn address(street: &str, city: &str) -> PostalAddress {
    PostalAddress {
        street: street.to_string(),
        city: city.to_string(),
        ..PostalAddress::default()
    }
}

/// An address already resolved to `(latitude, longitude)`.
pub fn located_address(street: &str, city: &str, latitude: f64, longitude: f64) -> PostalAddress {
    address(street, city).located_at(Coordinate::new(latitude, longitude))
}

/// Builder for test contacts.
#[derive(Debug, Clone)]
pub struct ContactBuilder {
    contact: Contact,
}

impl ContactBuilder {
    /// Contact with the given id and no other data.
    pub fn new(id: &str) -> Self {
        Self {
            contact: Contact::new(id, "", ""),
        }
    }

    /// Set the given name.
    pub fn given(mut self, name: &str) -> Self {
        self.contact.given_name = name.to_string();
        self
    }

    /// Set the family name.
    pub fn family(mut self, name: &str) -> Self {
        self.contact.family_name = name.to_string();
        self
    }

    /// Set the nickname.
    pub fn nickname(mut self, name: &str) -> Self {
        self.contact.nickname = name.to_string();
        self
    }

    /// Add an email address.
    pub fn email(mut self, email: &str) -> Self {
        self.contact.emails.push(email.to_string());
        self
    }

    /// Add a postal address.
    pub fn address(mut self, address: PostalAddress) -> Self {
        self.contact.postal_addresses.push(address);
        self
    }

    /// Finish.
    pub fn build(self) -> Contact {
        self.contact
    }
}
