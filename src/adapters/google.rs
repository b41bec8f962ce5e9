use crate::adapters::read_json;
use crate::config::credentials::GoogleCredentials;
use crate::config::toml_config::ReviewsConfig;
use crate::domain::model::{Review, ReviewBatch, ReviewTarget};
use crate::domain::ports::ReviewSource;
use crate::utils::error::{Result, Service};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const PLACE_FIELDS: &str = "id,displayName,reviews";

/// Reviews client for the Places API (place IDs) and the My Business v4 API (account/location IDs).
pub struct GoogleReviewsClient {
    client: Client,
    places_endpoint: String,
    business_endpoint: String,
    credentials: GoogleCredentials,
    page_size: usize,
    max_pages: usize,
}

impl GoogleReviewsClient {
    pub fn new(config: &ReviewsConfig, credentials: GoogleCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            places_endpoint: config.places_endpoint.trim_end_matches('/').to_string(),
            business_endpoint: config.business_endpoint.trim_end_matches('/').to_string(),
            credentials,
            page_size: config.page_size,
            max_pages: config.max_pages.max(1),
        })
    }

    async fn fetch_place(&self, place_id: &str) -> Result<ReviewBatch> {
        let resource = format!("places/{}", place_id);
        let url = format!("{}/v1/{}", self.places_endpoint, resource);
        let api_key = self.credentials.api_key.as_deref().unwrap_or_default();

        tracing::debug!("Requesting place details: {}", url);
        let response = self
            .client
            .get(&url)
            .header("X-Goog-Api-Key", api_key)
            .query(&[("fields", PLACE_FIELDS)])
            .send()
            .await?;

        let details: PlaceDetails = read_json(response, Service::Reviews, &resource).await?;

        let business_name = details
            .display_name
            .and_then(|name| name.text)
            .filter(|name| !name.trim().is_empty());
        let reviews = details.reviews.into_iter().map(Review::from).collect();

        Ok(ReviewBatch::new(business_name, reviews))
    }

    async fn fetch_location(&self, account_id: &str, location_id: &str) -> Result<ReviewBatch> {
        let resource = format!("accounts/{}/locations/{}", account_id, location_id);
        let url = format!("{}/v4/{}/reviews", self.business_endpoint, resource);
        let token = self.credentials.access_token.as_deref().unwrap_or_default();

        let mut reviews = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(token)
                .query(&[("pageSize", self.page_size.to_string())]);
            if let Some(page_token) = &page_token {
                request = request.query(&[("pageToken", page_token)]);
            }

            tracing::debug!("Requesting reviews page {} from {}", page_number, url);
            let response = request.send().await?;
            let page: ReviewsPage = read_json(response, Service::Reviews, &resource).await?;

            tracing::debug!("Page {} returned {} reviews", page_number, page.reviews.len());
            reviews.extend(page.reviews.into_iter().map(Review::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) if page_number == self.max_pages => {
                    tracing::info!(
                        "More reviews are available (next page token {}), stopping at max_pages = {}",
                        next,
                        self.max_pages
                    );
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(ReviewBatch::new(None, reviews))
    }
}

#[async_trait]
impl ReviewSource for GoogleReviewsClient {
    async fn fetch_reviews(&self, target: &ReviewTarget) -> Result<ReviewBatch> {
        self.credentials.ensure_supports(target)?;

        tracing::info!("🔎 Fetching reviews for {}", target);
        match target {
            ReviewTarget::Place { place_id } => self.fetch_place(place_id).await,
            ReviewTarget::Location {
                account_id,
                location_id,
            } => self.fetch_location(account_id, location_id).await,
        }
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn star_rating_value(rating: &str) -> Option<f32> {
    match rating {
        "ONE" => Some(1.0),
        "TWO" => Some(2.0),
        "THREE" => Some(3.0),
        "FOUR" => Some(4.0),
        "FIVE" => Some(5.0),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct LocalizedText {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplayNameRef {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceDetails {
    display_name: Option<LocalizedText>,
    #[serde(default)]
    reviews: Vec<PlaceReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceReview {
    rating: Option<f32>,
    text: Option<LocalizedText>,
    #[serde(alias = "author")]
    author_attribution: Option<DisplayNameRef>,
    publish_time: Option<String>,
}

impl From<PlaceReview> for Review {
    fn from(review: PlaceReview) -> Self {
        Review {
            text: review.text.and_then(|t| t.text).unwrap_or_default(),
            rating: review.rating,
            author: review.author_attribution.and_then(|a| a.display_name),
            timestamp: parse_timestamp(review.publish_time.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewsPage {
    #[serde(default)]
    reviews: Vec<BusinessReview>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusinessReview {
    reviewer: Option<DisplayNameRef>,
    star_rating: Option<String>,
    comment: Option<String>,
    create_time: Option<String>,
}

impl From<BusinessReview> for Review {
    fn from(review: BusinessReview) -> Self {
        Review {
            text: review.comment.unwrap_or_default(),
            rating: review.star_rating.as_deref().and_then(star_rating_value),
            author: review.reviewer.and_then(|r| r.display_name),
            timestamp: parse_timestamp(review.create_time.as_deref()),
        }
    }
}
