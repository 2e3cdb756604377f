use anyhow::{anyhow, Result};
use reqwest::Url;
use std::collections::HashMap;

use autofinder::ingest::{ingest_urls, PageSource, ParserRegistry};
use autofinder::listing::{load_store, save_store, Dealer, ListingStore};
use autofinder::notify::{compose_lead_email, BuyerContact};
use autofinder::output::format_tsv;
use autofinder::scoring::{rank_listings, HardFilters, MatchConfig};

/// Serves canned pages; anything else is a fetch failure.
struct Fixtures(HashMap<&'static str, &'static str>);

impl PageSource for Fixtures {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.0
            .get(url.as_str())
            .map(|body| body.to_string())
            .ok_or_else(|| anyhow!("no fixture for {}", url))
    }
}

const RESULTS_URL: &str = "https://www.cars.com/shopping/results/?page=1";
const RESULTS_PAGE: &str = r#"
<div class="vehicle-card">
  <a class="vehicle-card-link" href="/vehicledetail/pilot-17/"><h2 class="title">2017 Honda Pilot EX-L</h2></a>
  <span class="primary-price">$13,000</span>
  <div class="mileage">90,000 mi.</div>
</div>
<div class="vehicle-card">
  <a class="vehicle-card-link" href="/vehicledetail/pilot-15/"><h2 class="title">2015 Honda Pilot LX</h2></a>
  <span class="primary-price">$11,500</span>
  <div class="mileage">120,000 mi.</div>
</div>
<div class="vehicle-card">
  <a class="vehicle-card-link" href="/vehicledetail/call/"><h2 class="title">2016 Honda Pilot SE</h2></a>
  <span class="primary-price">Call for price</span>
</div>"#;

const DETAIL_URL: &str = "https://www.cars.com/vehicledetail/highlander-18/";
const DETAIL_PAGE: &str = r#"
<script type="application/ld+json">
{"@type": "Vehicle", "name": "2018 Toyota Highlander XLE",
 "brand": {"name": "Toyota"}, "model": "Highlander",
 "mileageFromOdometer": {"value": 70000},
 "driveWheelConfiguration": "AWD",
 "offers": {"price": "16500"}}
</script>"#;

fn fixtures() -> Fixtures {
    Fixtures(HashMap::from([(RESULTS_URL, RESULTS_PAGE), (DETAIL_URL, DETAIL_PAGE)]))
}

#[tokio::test]
async fn test_ingest_store_rank_lead() {
    let registry = ParserRegistry::with_defaults();
    let urls = vec![
        RESULTS_URL.to_string(),
        "https://www.cars.com/vehicledetail/missing/".to_string(),
        "https://unknown-dealer.example/cars".to_string(),
        DETAIL_URL.to_string(),
    ];

    let listings = ingest_urls(&urls, &registry, &fixtures(), 2).await;
    // the unpriced card, the failed fetch and the unknown site add nothing
    assert_eq!(listings.len(), 3);
    assert!(listings.iter().all(|l| l.source.as_deref() == Some("cars.com")));
    assert_eq!(listings[2].drivetrain.as_deref(), Some("AWD"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("listings.json");
    let mut store = ListingStore::new();
    assert_eq!(store.merge(listings.clone()), (3, 0));
    save_store(&path, &store).unwrap();

    // ingesting the same pages again updates in place
    let mut reloaded = load_store(&path).unwrap();
    assert_eq!(reloaded.merge(listings), (0, 3));
    assert_eq!(reloaded.listings.len(), 3);
    assert_eq!(reloaded.listings, store.listings);

    let config = MatchConfig {
        filters: Some(HardFilters {
            max_miles: Some(100_000),
            ..HardFilters::default()
        }),
        ..MatchConfig::default()
    };
    let response = rank_listings(&reloaded.listings, &config).unwrap();
    assert_eq!(response.total_candidates, 2);
    assert!(response
        .results
        .iter()
        .all(|r| r.listing.id != "https://www.cars.com/vehicledetail/pilot-15/"));

    let tsv = format_tsv(&response.results);
    assert_eq!(tsv.lines().count(), 2);
    assert!(tsv.contains("https://www.cars.com/vehicledetail/highlander-18/"));

    let top = &response.results[0].listing;
    let dealer = Dealer {
        name: "cars.com seller".to_string(),
        email: Some("sales@seller.example".to_string()),
    };
    let buyer = BuyerContact {
        name: "Sam Rivera".to_string(),
        email: "sam@example.com".to_string(),
        ..BuyerContact::default()
    };
    let lead = compose_lead_email(&dealer, &buyer, top);
    assert!(lead.subject.ends_with(&top.title()));
    assert!(lead.body.contains(&top.id));
}

#[tokio::test]
async fn test_ingest_nothing_usable() {
    let registry = ParserRegistry::with_defaults();
    let urls = vec!["not a url".to_string(), "ftp://www.cars.com/x".to_string()];
    assert!(ingest_urls(&urls, &registry, &fixtures(), 4).await.is_empty());
}
