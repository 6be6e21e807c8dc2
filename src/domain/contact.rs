//! Contact and sell-your-property form types
//!
//! Both forms end up as a plain-text email to the agency inbox.

use serde::Deserialize;
use uuid::Uuid;

use super::properties::PropertyType;

const MAX_MESSAGE_LEN: usize = 5000;

/// Email ready to hand to the delivery API
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub text: String,
    pub reply_to: Option<String>,
}

/// Minimal shape check: one '@', non-empty local part, dotted domain, no spaces
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn required(value: &str, field: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(value.to_string())
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Contact page form, optionally about a specific listing
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub property_id: Option<Uuid>,
}

/// Contact form that passed validation, fields trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub property_id: Option<Uuid>,
}

impl ContactRequest {
    pub fn validated(self) -> Result<ContactMessage, String> {
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;
        if !is_plausible_email(&email) {
            return Err("email is not valid".to_string());
        }
        let message = required(&self.message, "message")?;
        if message.len() > MAX_MESSAGE_LEN {
            return Err("message is too long".to_string());
        }

        Ok(ContactMessage {
            name,
            email,
            phone: optional(&self.phone),
            message,
            property_id: self.property_id,
        })
    }
}

impl ContactMessage {
    /// `property_title` names the listing the message is about, when known
    pub fn into_email(self, property_title: Option<&str>) -> OutgoingEmail {
        let subject = match property_title {
            Some(title) => format!("Richiesta informazioni: {}", title),
            None => format!("Nuovo messaggio da {}", self.name),
        };

        let mut text = format!("Nome: {}\nEmail: {}\n", self.name, self.email);
        if let Some(phone) = &self.phone {
            text.push_str(&format!("Telefono: {}\n", phone));
        }
        if let Some(id) = self.property_id {
            text.push_str(&format!("Immobile: {}\n", id));
        }
        text.push_str(&format!("\n{}\n", self.message));

        OutgoingEmail {
            subject,
            text,
            reply_to: Some(self.email),
        }
    }
}

/// Sell-your-property form
#[derive(Debug, Clone, Deserialize)]
pub struct SellRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub square_meters: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SellRequest {
    pub fn into_email(self) -> Result<OutgoingEmail, String> {
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;
        if !is_plausible_email(&email) {
            return Err("email is not valid".to_string());
        }
        let phone = required(&self.phone, "phone")?;
        let city = required(&self.city, "city")?;
        if self.square_meters.is_some_and(|m| m <= 0) {
            return Err("square_meters must be positive".to_string());
        }

        let mut text = format!(
            "Nome: {}\nEmail: {}\nTelefono: {}\nCittà: {}\n",
            name, email, phone, city
        );
        if let Some(address) = optional(&self.address) {
            text.push_str(&format!("Indirizzo: {}\n", address));
        }
        if let Some(kind) = self.property_type {
            text.push_str(&format!("Tipologia: {}\n", kind.as_str()));
        }
        if let Some(sqm) = self.square_meters {
            text.push_str(&format!("Superficie: {} m²\n", sqm));
        }
        if let Some(notes) = optional(&self.notes) {
            if notes.len() > MAX_MESSAGE_LEN {
                return Err("notes are too long".to_string());
            }
            text.push_str(&format!("\n{}\n", notes));
        }

        Ok(OutgoingEmail {
            subject: format!("Richiesta di valutazione a {}", city),
            text,
            reply_to: Some(email),
        })
    }
}
