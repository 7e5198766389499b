use mongodb::bson::{self, Document};
use serde::{Serialize, Serializer};

use crate::error::AppError;
use crate::models::validation::{FieldError, Fields};

/// A content record that can be validated from a request body and stored as
/// a BSON document.
pub trait Record: Serialize + Sized {
    /// Build the record from a request body, rejecting the first invalid field.
    fn parse(fields: &Fields) -> Result<Self, FieldError>;

    fn to_document(&self) -> Result<Document, AppError> {
        bson::to_document(self)
            .map_err(|e| AppError::Internal(format!("Failed to encode record: {}", e)))
    }
}

fn to_bson_datetime(dt: chrono::DateTime<chrono::Utc>) -> bson::DateTime {
    bson::DateTime::from_chrono(dt)
}

/// Whole prices are written as integers so `20` reads back as `20`, not `20.0`.
fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if price.fract() == 0.0 && price.abs() < 9.0e15 {
        serializer.serialize_i64(*price as i64)
    } else {
        serializer.serialize_f64(*price)
    }
}

/// A community submission ("The Club").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// Display name of the contributor.
    pub author_name: String,
    /// Social or Chess.com handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short text or caption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Keywords or themes.
    pub tags: Vec<String>,
}

impl Record for Submission {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            author_name: f.required_str("author_name")?,
            author_handle: f.optional_str("author_handle")?,
            title: f.optional_str("title")?,
            content: f.optional_str("content")?,
            image_url: f.optional_url("image_url")?,
            tags: f.str_list("tags")?,
        })
    }
}

/// A featured club member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Record for Member {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            name: f.required_str("name")?,
            role: f.optional_str("role")?,
            avatar_url: f.optional_url("avatar_url")?,
            bio: f.optional_str("bio")?,
        })
    }
}

/// The rotating weekly thought.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thought {
    pub quote: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_of: Option<bson::DateTime>,
}

impl Record for Thought {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            quote: f.required_str("quote")?,
            author: f.optional_str("author")?,
            week_of: f.optional_timestamp("week_of")?.map(to_bson_datetime),
        })
    }
}

/// An entry in "The Archive".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveEntry {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub image_urls: Vec<String>,
    /// e.g. `S/S 24`, `Prototype v2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_label: Option<String>,
}

impl Record for ArchiveEntry {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            title: f.required_str("title")?,
            subtitle: f.optional_str("subtitle")?,
            body: f.optional_str("body")?,
            image_urls: f.url_list("image_urls")?,
            timeline_label: f.optional_str("timeline_label")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub title: String,
    pub date: bson::DateTime,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub rsvp_open: bool,
}

impl Record for Event {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            title: f.required_str("title")?,
            date: to_bson_datetime(f.required_timestamp("date")?),
            location: f.required_str("location")?,
            description: f.optional_str("description")?,
            image_url: f.optional_url("image_url")?,
            rsvp_open: f.bool_or("rsvp_open", true)?,
        })
    }
}

/// An RSVP to an event. `event_id` is copied verbatim and never checked
/// against the `event` collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rsvp {
    pub event_id: String,
    pub name: String,
    pub email: String,
}

impl Record for Rsvp {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            event_id: f.required_str("event_id")?,
            name: f.required_str("name")?,
            email: f.required_str("email")?,
        })
    }
}

/// A shop product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    /// URL-friendly identifier. Not unique.
    pub slug: String,
    #[serde(serialize_with = "serialize_price")]
    pub price: f64,
    pub currency: String,
    /// One-line story.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub images: Vec<String>,
    pub in_stock: bool,
}

impl Record for Product {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            name: f.required_str("name")?,
            slug: f.required_str("slug")?,
            price: f.non_negative_number("price")?,
            currency: f.str_or("currency", "USD")?,
            short: f.optional_str("short")?,
            description: f.optional_str("description")?,
            images: f.url_list("images")?,
            in_stock: f.bool_or("in_stock", true)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsletterSignup {
    pub email: String,
    /// Where the signup came from, e.g. `hero-modal`, `footer`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Record for NewsletterSignup {
    fn parse(f: &Fields) -> Result<Self, FieldError> {
        Ok(Self {
            email: f.required_str("email")?,
            source: f.optional_str("source")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, Bson};
    use serde_json::json;

    fn parse<R: Record>(body: serde_json::Value) -> Result<R, FieldError> {
        R::parse(&Fields::from_body(body).unwrap())
    }

    #[test]
    fn test_product_defaults() {
        let product: Product = parse(json!({ "name": "Tee", "slug": "tee-1", "price": 20 })).unwrap();
        assert_eq!(product.currency, "USD");
        assert!(product.in_stock);
        assert!(product.images.is_empty());
        assert_eq!(product.short, None);
    }

    #[test]
    fn test_product_document_shape() {
        let product: Product = parse(json!({ "name": "Tee", "slug": "tee-1", "price": 20 })).unwrap();
        let document = product.to_document().unwrap();
        assert_eq!(
            document,
            doc! {
                "name": "Tee",
                "slug": "tee-1",
                "price": 20_i64,
                "currency": "USD",
                "images": [],
                "in_stock": true
            }
        );
    }

    #[test]
    fn test_fractional_price_stored_as_double() {
        let product: Product =
            parse(json!({ "name": "Board", "slug": "board", "price": 49.99 })).unwrap();
        let document = product.to_document().unwrap();
        assert_eq!(document.get("price"), Some(&Bson::Double(49.99)));
    }

    #[test]
    fn test_product_rejects_negative_price() {
        let err = parse::<Product>(json!({ "name": "Tee", "slug": "tee-1", "price": -1 }))
            .unwrap_err();
        assert_eq!(err.field, "price");
    }

    #[test]
    fn test_product_requires_price() {
        let err = parse::<Product>(json!({ "name": "Tee", "slug": "tee-1" })).unwrap_err();
        assert_eq!(err, FieldError::new("price", "field required"));
    }

    #[test]
    fn test_submission_defaults_tags_and_skips_absent_fields() {
        let submission: Submission = parse(json!({ "author_name": "Ada" })).unwrap();
        let document = submission.to_document().unwrap();
        assert_eq!(document, doc! { "author_name": "Ada", "tags": [] });
    }

    #[test]
    fn test_submission_validates_image_url() {
        let err = parse::<Submission>(json!({ "author_name": "Ada", "image_url": "nope" }))
            .unwrap_err();
        assert_eq!(err.field, "image_url");
    }

    #[test]
    fn test_event_stores_date_as_bson_datetime() {
        let event: Event = parse(json!({
            "title": "Blitz night",
            "date": "2024-05-01T18:30:00Z",
            "location": "Back room",
        }))
        .unwrap();
        assert!(event.rsvp_open);

        let document = event.to_document().unwrap();
        assert!(matches!(document.get("date"), Some(Bson::DateTime(_))));
        assert!(document.get_bool("rsvp_open").unwrap());
    }

    #[test]
    fn test_event_requires_location() {
        let err = parse::<Event>(json!({ "title": "Blitz", "date": "2024-05-01" })).unwrap_err();
        assert_eq!(err.field, "location");
    }

    #[test]
    fn test_thought_optional_week_of() {
        let thought: Thought = parse(json!({ "quote": "Tactics flow from a superior position." })).unwrap();
        assert_eq!(thought.week_of, None);
        assert!(!thought.to_document().unwrap().contains_key("week_of"));
    }

    #[test]
    fn test_archive_entry_image_urls() {
        let entry: ArchiveEntry = parse(json!({
            "title": "Prototype",
            "image_urls": ["https://cdn.example.com/a.png", "http://cdn.example.com/b.png"],
        }))
        .unwrap();
        assert_eq!(entry.image_urls.len(), 2);

        let err = parse::<ArchiveEntry>(json!({ "title": "x", "image_urls": ["ok", 3] }))
            .unwrap_err();
        assert_eq!(err.field, "image_urls[0]");
    }

    #[test]
    fn test_rsvp_requires_all_fields() {
        let err = parse::<Rsvp>(json!({ "event_id": "abc", "name": "Bo" })).unwrap_err();
        assert_eq!(err.field, "email");
    }

    #[test]
    fn test_member_and_newsletter() {
        let member: Member = parse(json!({ "name": "Magnus", "avatar_url": null })).unwrap();
        assert_eq!(member.avatar_url, None);

        let signup: NewsletterSignup =
            parse(json!({ "email": "a@b.c", "source": "footer" })).unwrap();
        assert_eq!(signup.source.as_deref(), Some("footer"));
    }
}
