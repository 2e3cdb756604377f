use anyhow::{Context, Result};

use crate::listing::Listing;

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Open a listing's source page. Listings entered by hand may have no URL.
pub fn open_listing(listing: &Listing) -> Result<()> {
    let url = listing
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .with_context(|| format!("Listing {} has no URL to open", listing.id))?;
    open_url(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_listing_without_url_fails() {
        let err = open_listing(&Listing::new("vin-1")).unwrap_err();
        assert!(err.to_string().contains("vin-1"));
    }
}
