//! Records owned by the backend service.
//!
//! Each record carries the backend's numeric id; each `*Input` type is the
//! payload sent on create/update. Field names travel as `camelCase`.

pub mod blog;
pub mod lead;
pub mod media;
pub mod promotion;
pub mod stats;
pub mod testimonial;
pub mod vehicle;

pub use blog::{BlogComment, BlogPost, BlogPostInput, CommentInput, InteractionSummary, slugify};
pub use lead::{Contact, ContactInput, CreditSimulation, CreditSimulationInput, CreditTerms};
pub use media::{MediaAsset, MediaInput};
pub use promotion::{Promotion, PromotionInput};
pub use stats::{PageVisits, VisitorStats};
pub use testimonial::{Testimonial, TestimonialInput};
pub use vehicle::{Vehicle, VehicleInput};
