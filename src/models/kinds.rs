use mongodb::bson::Document;
use serde_json::Value;

use crate::error::AppError;
use crate::models::records::{
    ArchiveEntry, Event, Member, NewsletterSignup, Product, Record, Rsvp, Submission, Thought,
};
use crate::models::validation::Fields;

/// How a kind is exposed through `GET` on its collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Write-only: no `GET` route.
    None,
    /// The first `limit` records in natural order.
    Page { default_limit: i64 },
    /// Only the most recently inserted record.
    Latest,
}

/// Static description of one content kind.
///
/// The router registers one `POST` (and, depending on [`Listing`], one `GET`)
/// per descriptor in [`KINDS`].
pub struct KindDescriptor {
    pub name: &'static str,
    pub path: &'static str,
    /// The kind's name, lower-cased.
    pub collection: &'static str,
    pub listing: Listing,
    validate: fn(Value) -> Result<Document, AppError>,
}

impl KindDescriptor {
    /// Validate a request body and encode it as the document to insert.
    pub fn validate(&self, body: Value) -> Result<Document, AppError> {
        (self.validate)(body)
    }
}

impl std::fmt::Debug for KindDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("collection", &self.collection)
            .field("listing", &self.listing)
            .finish()
    }
}

fn validate_as<R: Record>(body: Value) -> Result<Document, AppError> {
    let fields = Fields::from_body(body)?;
    R::parse(&fields)?.to_document()
}

pub static SUBMISSION: KindDescriptor = KindDescriptor {
    name: "Submission",
    path: "/api/submissions",
    collection: "submission",
    listing: Listing::Page { default_limit: 24 },
    validate: validate_as::<Submission>,
};

pub static MEMBER: KindDescriptor = KindDescriptor {
    name: "Member",
    path: "/api/members",
    collection: "member",
    listing: Listing::Page { default_limit: 12 },
    validate: validate_as::<Member>,
};

pub static THOUGHT: KindDescriptor = KindDescriptor {
    name: "Thought",
    path: "/api/thought",
    collection: "thought",
    listing: Listing::Latest,
    validate: validate_as::<Thought>,
};

pub static ARCHIVE_ENTRY: KindDescriptor = KindDescriptor {
    name: "ArchiveEntry",
    path: "/api/archive",
    collection: "archiveentry",
    listing: Listing::Page { default_limit: 20 },
    validate: validate_as::<ArchiveEntry>,
};

pub static EVENT: KindDescriptor = KindDescriptor {
    name: "Event",
    path: "/api/events",
    collection: "event",
    listing: Listing::Page { default_limit: 20 },
    validate: validate_as::<Event>,
};

pub static RSVP: KindDescriptor = KindDescriptor {
    name: "RSVP",
    path: "/api/rsvp",
    collection: "rsvp",
    listing: Listing::None,
    validate: validate_as::<Rsvp>,
};

pub static PRODUCT: KindDescriptor = KindDescriptor {
    name: "Product",
    path: "/api/products",
    collection: "product",
    listing: Listing::Page { default_limit: 24 },
    validate: validate_as::<Product>,
};

pub static NEWSLETTER_SIGNUP: KindDescriptor = KindDescriptor {
    name: "NewsletterSignup",
    path: "/api/newsletter",
    collection: "newslettersignup",
    listing: Listing::None,
    validate: validate_as::<NewsletterSignup>,
};

/// Every content kind served by the API.
pub static KINDS: [&KindDescriptor; 8] = [
    &SUBMISSION,
    &MEMBER,
    &THOUGHT,
    &ARCHIVE_ENTRY,
    &EVENT,
    &RSVP,
    &PRODUCT,
    &NEWSLETTER_SIGNUP,
];
