use regex::Regex;
use reqwest::Url;
use serde_json::Value;
use std::sync::LazyLock;

use super::html::{
    elements, find_miles, first_with_class, first_with_tag, parse_int, parse_title, strip_tags,
    Element,
};
use super::registry::{Page, PageParser};
use crate::listing::Listing;

static LD_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid ld+json regex")
});

const CARD_CLASSES: [&str; 2] = ["vehicle-card", "shop-srp-listings__listing"];
const CARD_TITLE_CLASSES: [&str; 1] = ["vehicle-card-link"];
const CARD_PRICE_CLASSES: [&str; 3] = ["primary-price", "vehicle-card-price", "price"];
const CARD_MILES_CLASSES: [&str; 3] = ["mileage", "mileage-amount", "miles"];
const DETAIL_TITLE_CLASSES: [&str; 2] = ["vehicle-info__title", "cui-heading-2"];
const DETAIL_PRICE_CLASSES: [&str; 3] = ["primary-price", "vehicle-info__price-display", "cui-heading-3"];
const DETAIL_MILES_CLASSES: [&str; 2] = ["mileage", "mileage-amount"];

/// cars.com search results and vehicle detail pages.
#[derive(Debug, Default)]
pub struct CarsComParser;

impl PageParser for CarsComParser {
    fn name(&self) -> &str {
        "cars.com"
    }

    fn parse(&self, page: &Page) -> Vec<Listing> {
        if page.url.path().contains("vehicledetail") {
            parse_detail(page).into_iter().collect()
        } else {
            parse_results(page)
        }
    }
}

/// A detail page describes one vehicle. Structured data wins over markup.
fn parse_detail(page: &Page) -> Option<Listing> {
    let id = canonical_url(&page.url);

    let from_ld_json = LD_JSON_RE.captures_iter(&page.body).find_map(|caps| {
        let value: Value = serde_json::from_str(caps[1].trim()).ok()?;
        ld_json_candidates(&value)
            .into_iter()
            .find_map(|item| vehicle_from_ld_json(item, &id))
    });
    if from_ld_json.is_some() {
        return from_ld_json;
    }

    let found = elements(&page.body);
    let title = first_with_tag(&found, &["h1"])
        .or_else(|| first_with_class(&found, &DETAIL_TITLE_CLASSES))?
        .text();
    let price = first_with_class(&found, &DETAIL_PRICE_CLASSES).and_then(|e| parse_int(&e.text()))?;
    let miles = first_with_class(&found, &DETAIL_MILES_CLASSES)
        .and_then(|e| parse_int(&e.text()))
        .or_else(|| find_miles(&strip_tags(&page.body)));

    let mut listing = listing_from_title(&id, &title);
    listing.price = Some(price);
    listing.miles = miles;
    listing.url = Some(id);
    Some(listing)
}

/// A results page holds one card per vehicle.
fn parse_results(page: &Page) -> Vec<Listing> {
    let body = page.body.as_str();
    let starts: Vec<usize> = elements(body)
        .iter()
        .filter(|e| e.name == "div" && CARD_CLASSES.iter().any(|c| e.has_class(c)))
        .map(|e| e.start)
        .collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(body.len());
            parse_card(&body[start..end], i, &page.url)
        })
        .collect()
}

fn parse_card(card: &str, index: usize, page_url: &Url) -> Option<Listing> {
    let found = elements(card);

    let link = first_with_class(&found, &CARD_TITLE_CLASSES);
    let title_element: &Element = link
        .or_else(|| first_with_tag(&found, &["h2"]))
        .or_else(|| first_with_class(&found, &["title"]))?;
    let title = title_element.text();
    let price = first_with_class(&found, &CARD_PRICE_CLASSES)?.text();

    let href = link
        .and_then(|a| a.attr("href"))
        .and_then(|href| page_url.join(&href).ok());
    let id = match &href {
        Some(url) => canonical_url(url),
        None => format!("{}#{}", page_url, index + 1),
    };

    let mut listing = listing_from_title(&id, &title);
    listing.price = parse_int(&price);
    listing.miles = first_with_class(&found, &CARD_MILES_CLASSES).and_then(|e| parse_int(&e.text()));
    listing.url = href.map(|u| u.to_string());
    Some(listing)
}

fn listing_from_title(id: &str, title: &str) -> Listing {
    let parts = parse_title(title);
    Listing {
        year: parts.year,
        make: parts.make,
        model: parts.model,
        trim: parts.trim,
        age_category: parts.age_category,
        ..Listing::new(id)
    }
}

fn canonical_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.to_string()
}

/// JSON-LD blocks hold an object, a list of objects or an "@graph".
fn ld_json_candidates(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(ld_json_candidates).collect(),
        Value::Object(map) => match map.get("@graph") {
            Some(graph) => ld_json_candidates(graph),
            None => vec![value],
        },
        _ => Vec::new(),
    }
}

fn is_vehicle_type(value: Option<&Value>) -> bool {
    let is_vehicle =
        |t: &str| t == "Vehicle" || t == "Car" || t.ends_with("/Vehicle") || t.ends_with("/Car");
    match value {
        Some(Value::String(t)) => is_vehicle(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(is_vehicle),
        _ => false,
    }
}

fn vehicle_from_ld_json(item: &Value, id: &str) -> Option<Listing> {
    if !is_vehicle_type(item.get("@type")) {
        return None;
    }

    let name = item.get("name").and_then(Value::as_str).unwrap_or_default();
    let mut listing = listing_from_title(id, name);

    let offer = match item.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    };
    listing.price = offer.and_then(|o| number(o.get("price"))).and_then(to_u32);

    listing.miles = match item.get("mileageFromOdometer").or_else(|| item.get("mileage")) {
        Some(m @ Value::Object(_)) => number(m.get("value")),
        other => number(other),
    }
    .and_then(to_u32);

    let year = ["vehicleModelDate", "modelDate", "productionDate"]
        .iter()
        .find_map(|key| item.get(*key))
        .and_then(|v| match v {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => s.get(..4).and_then(|y| y.parse().ok()),
            _ => None,
        });
    listing.year = year.or(listing.year);

    if let Some(make) = named(item.get("brand")).or_else(|| named(item.get("manufacturer"))) {
        listing.make = Some(make);
    }
    if let Some(model) = named(item.get("model")) {
        listing.model = Some(model);
    }
    if let Some(trim) = item.get("vehicleConfiguration").and_then(Value::as_str) {
        listing.trim = Some(trim.to_string());
    }

    listing.body_style = item.get("bodyType").and_then(Value::as_str).map(str::to_string);
    listing.drivetrain = item
        .get("driveWheelConfiguration")
        .and_then(Value::as_str)
        .map(drivetrain_label);
    listing.seats = number(item.get("seatingCapacity").or_else(|| item.get("vehicleSeatingCapacity")))
        .and_then(to_u32);
    if let Some(condition) = item.get("itemCondition").and_then(Value::as_str) {
        listing.age_category = age_from_condition(condition).or(listing.age_category);
    }
    listing.url = Some(id.to_string());

    Some(listing)
}

/// A name given either as a plain string or as `{"name": ...}`.
fn named(value: Option<&Value>) -> Option<String> {
    let name = match value? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    };
    name.filter(|s| !s.trim().is_empty())
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace([',', '$'], "").trim().parse().ok(),
        _ => None,
    }
}

fn to_u32(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX)).then(|| value.round() as u32)
}

fn drivetrain_label(configuration: &str) -> String {
    let lower = configuration.to_ascii_lowercase();
    if lower.contains("allwheel") || lower.contains("all-wheel") || lower == "awd" {
        "AWD".to_string()
    } else if lower.contains("fourwheel") || lower.contains("four-wheel") || lower == "4wd" {
        "4WD".to_string()
    } else if lower.contains("frontwheel") || lower.contains("front-wheel") || lower == "fwd" {
        "FWD".to_string()
    } else if lower.contains("rearwheel") || lower.contains("rear-wheel") || lower == "rwd" {
        "RWD".to_string()
    } else {
        configuration.to_string()
    }
}

fn age_from_condition(condition: &str) -> Option<String> {
    let lower = condition.to_ascii_lowercase();
    if lower.contains("newcondition") {
        Some("new".to_string())
    } else if lower.contains("usedcondition") {
        Some("used".to_string())
    } else {
        None
    }
}
