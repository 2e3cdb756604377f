use serde::Serialize;
use std::fmt;

use crate::listing::{Dealer, Listing};

/// The buyer asking a dealer about a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// A composed lead message. Nothing is sent; callers decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadEmail {
    /// None when the dealer has no address on file
    pub to: Option<String>,
    pub subject: String,
    pub body: String,
}

impl fmt::Display for LeadEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "To: {}", self.to.as_deref().unwrap_or("(no dealer e-mail on file)"))?;
        writeln!(f, "Subject: {}", self.subject)?;
        writeln!(f)?;
        write!(f, "{}", self.body)
    }
}

/// Compose the plain-text e-mail that introduces a buyer to a dealer.
pub fn compose_lead_email(dealer: &Dealer, buyer: &BuyerContact, listing: &Listing) -> LeadEmail {
    let vehicle = listing.title();
    let subject = format!("New lead from autofinder - {}", vehicle);

    let price = listing
        .price
        .map(|p| format!("${}", format_thousands(u64::from(p))))
        .unwrap_or_else(|| "Not listed".to_string());
    let miles = listing
        .miles
        .map(|m| format!("{} mi", format_thousands(u64::from(m))))
        .unwrap_or_else(|| "Unknown".to_string());
    let notes = buyer
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("No additional notes.");
    let phone = buyer
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("Not provided");

    let body = [
        format!("Hello {},", dealer.name),
        String::new(),
        "A buyer is interested in one of your vehicles through autofinder.".to_string(),
        String::new(),
        "Buyer:".to_string(),
        format!("  Name  : {}", buyer.name),
        format!("  Email : {}", buyer.email),
        format!("  Phone : {}", phone),
        String::new(),
        "Vehicle:".to_string(),
        format!("  {}", vehicle),
        format!("  ID    : {}", listing.id),
        format!("  Price : {}", price),
        format!("  Miles : {}", miles),
        String::new(),
        "Notes from the buyer:".to_string(),
        format!("  {}", notes),
        String::new(),
        "Please contact the buyer to arrange a visit or a test drive.".to_string(),
    ]
    .join("\n");

    LeadEmail {
        to: dealer.email.clone().filter(|e| !e.trim().is_empty()),
        subject,
        body,
    }
}

/// 1234567 -> "1,234,567"
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
