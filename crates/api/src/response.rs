//! Shared response envelope types for API handlers.
//!
//! Plain CRUD endpoints return the entity JSON directly. The lock and unlock
//! sub-resources wrap the updated item together with a HATEOAS-style self
//! link pointing back at the base resource, via [`LinkedResponse`].

use serde::Serialize;

use pressroom_core::locking::ItemKind;
use pressroom_core::types::DbId;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A single link descriptor.
#[derive(Debug, Serialize)]
pub struct Link {
    pub title: &'static str,
    pub href: String,
}

/// The link set attached to lock/unlock responses.
#[derive(Debug, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Link,
}

impl Links {
    /// Self link for an item of the given kind.
    pub fn for_item(kind: ItemKind, id: DbId) -> Self {
        let title = match kind {
            ItemKind::Events => "Events",
            ItemKind::Planning => "Planning",
        };
        Links {
            self_link: Link {
                title,
                href: format!("/api/v1/{}/{id}", kind.as_str()),
            },
        }
    }
}

/// An item representation augmented with a self-link descriptor.
#[derive(Debug, Serialize)]
pub struct LinkedResponse<T: Serialize> {
    pub data: T,
    pub links: Links,
}

impl<T: Serialize> LinkedResponse<T> {
    pub fn new(kind: ItemKind, id: DbId, data: T) -> Self {
        Self {
            data,
            links: Links::for_item(kind, id),
        }
    }
}
