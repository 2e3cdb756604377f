use reqwest::Url;
use std::collections::HashMap;

use super::cars_com::CarsComParser;
use crate::listing::Listing;

/// A fetched page handed to a parser.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

/// Extracts zero or more listings from one page of one site.
pub trait PageParser: Send + Sync {
    fn name(&self) -> &str;

    /// Listings found on the page. Parsers never fail; a page they do not
    /// understand simply yields nothing.
    fn parse(&self, page: &Page) -> Vec<Listing>;
}

/// Used for domains without a dedicated parser.
#[derive(Debug, Default)]
pub struct GenericParser;

impl PageParser for GenericParser {
    fn name(&self) -> &str {
        "generic"
    }

    fn parse(&self, _page: &Page) -> Vec<Listing> {
        Vec::new()
    }
}

/// Maps a site's domain to the parser that understands its pages.
pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn PageParser>>,
    fallback: Box<dyn PageParser>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ParserRegistry {
    /// An empty registry that sends every domain to the generic parser.
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
            fallback: Box::new(GenericParser),
        }
    }

    /// Registry with every parser that ships with autofinder.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("cars.com", Box::new(CarsComParser));
        registry
    }

    pub fn register(&mut self, domain: &str, parser: Box<dyn PageParser>) {
        self.parsers.insert(normalize_domain(domain), parser);
    }

    /// Parser for a host; "www." is ignored and unknown hosts get the fallback.
    pub fn for_host(&self, host: &str) -> &dyn PageParser {
        self.parsers
            .get(&normalize_domain(host))
            .map(|p| p.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }
}

/// Lowercased host without a leading "www.".
pub fn normalize_domain(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}
