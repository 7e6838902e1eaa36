//! Per-entity description of the token-gated RPC surface.
//!
//! Each admin-managed record type names its RPC methods once here; the
//! generic operations in [`crate::admin`] and the admin panel's query layer
//! are written against these traits instead of one hand-written wrapper per
//! entity.

use serde::Serialize;
use serde::de::DeserializeOwned;

use showroom_core::{
    BlogComment, BlogPost, BlogPostId, BlogPostInput, CommentId, Contact, ContactId,
    CreditSimulation, CreditSimulationId, MediaAsset, MediaAssetId, MediaInput, Promotion,
    PromotionId, PromotionInput, Testimonial, TestimonialId, TestimonialInput, Vehicle, VehicleId,
    VehicleInput,
};

/// Cache slots for backend data. Used as cache keys by the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Vehicles,
    Promotions,
    Testimonials,
    BlogPosts,
    BlogComments,
    Interactions,
    Media,
    Contacts,
    CreditSimulations,
    VisitorStats,
}

impl ResourceKind {
    /// Short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::Promotions => "promotions",
            Self::Testimonials => "testimonials",
            Self::BlogPosts => "blog_posts",
            Self::BlogComments => "blog_comments",
            Self::Interactions => "interactions",
            Self::Media => "media",
            Self::Contacts => "contacts",
            Self::CreditSimulations => "credit_simulations",
            Self::VisitorStats => "visitor_stats",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that can be listed, fetched and deleted with a session token.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Typed id of the record.
    type Id: Copy + Serialize + std::fmt::Display + Send + Sync;

    /// Cache slot holding this resource's list.
    const KIND: ResourceKind;
    /// RPC method returning every record.
    const LIST: &'static str;
    /// RPC method returning one record by id.
    const GET: &'static str;
    /// RPC method deleting one record by id.
    const DELETE: &'static str;
    /// Other cache slots derived from this resource.
    const RELATED: &'static [ResourceKind] = &[];
}

/// A [`Resource`] that can also be created and updated.
pub trait Editable: Resource {
    /// Create/update payload.
    type Input: Serialize + Send + Sync;

    /// RPC method creating a record.
    const CREATE: &'static str;
    /// RPC method updating a record.
    const UPDATE: &'static str;
}

macro_rules! resource {
    ($entity:ty, $id:ty, $kind:ident, $list:literal, $get:literal, $delete:literal $(, related = [$($rel:ident),*])?) => {
        impl Resource for $entity {
            type Id = $id;
            const KIND: ResourceKind = ResourceKind::$kind;
            const LIST: &'static str = $list;
            const GET: &'static str = $get;
            const DELETE: &'static str = $delete;
            $(const RELATED: &'static [ResourceKind] = &[$(ResourceKind::$rel),*];)?
        }
    };
}

macro_rules! editable {
    ($entity:ty, $input:ty, $create:literal, $update:literal) => {
        impl Editable for $entity {
            type Input = $input;
            const CREATE: &'static str = $create;
            const UPDATE: &'static str = $update;
        }
    };
}

resource!(Vehicle, VehicleId, Vehicles, "getAllVehicles", "getVehicle", "deleteVehicle");
editable!(Vehicle, VehicleInput, "createVehicle", "updateVehicle");

resource!(Promotion, PromotionId, Promotions, "getAllPromotions", "getPromotion", "deletePromotion");
editable!(Promotion, PromotionInput, "createPromotion", "updatePromotion");

resource!(Testimonial, TestimonialId, Testimonials, "getAllTestimonials", "getTestimonial", "deleteTestimonial");
editable!(Testimonial, TestimonialInput, "createTestimonial", "updateTestimonial");

resource!(BlogPost, BlogPostId, BlogPosts, "getAllPosts", "getPost", "deletePost", related = [Interactions]);
editable!(BlogPost, BlogPostInput, "createPost", "updatePost");

resource!(BlogComment, CommentId, BlogComments, "getAllComments", "getComment", "deleteComment", related = [BlogPosts, Interactions]);

resource!(MediaAsset, MediaAssetId, Media, "getAllMedia", "getMedia", "deleteMedia");
editable!(MediaAsset, MediaInput, "uploadMedia", "updateMedia");

resource!(Contact, ContactId, Contacts, "getContacts", "getContact", "deleteContact");

resource!(CreditSimulation, CreditSimulationId, CreditSimulations, "getCreditSimulations", "getCreditSimulation", "deleteCreditSimulation");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_caches() {
        assert!(Vehicle::RELATED.is_empty());
        assert_eq!(BlogPost::RELATED, &[ResourceKind::Interactions]);
        assert_eq!(
            BlogComment::RELATED,
            &[ResourceKind::BlogPosts, ResourceKind::Interactions]
        );
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Contact::LIST, "getContacts");
        assert_eq!(<MediaAsset as Editable>::CREATE, "uploadMedia");
        assert_eq!(<BlogPost as Editable>::UPDATE, "updatePost");
    }
}
