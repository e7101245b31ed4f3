pub mod core;

pub use crate::core::display::{
    display_authors, display_feeds, format_date, format_time, truncate_title,
};
pub use crate::core::gateway::{DeleteOutcome, GatewayError, MetadataGateway, DEFAULT_BASE_URL};
pub use crate::core::listing::{normalize_text, ListMode, MetadataListing, PAGE_SIZE};
pub use crate::core::metadata::{AuthorEntry, FeedEntry, MetadataRecord, MetadataUpdate};
pub use crate::core::workflow::{
    ActionOutcome, AdminSession, Decision, DialogKind, DialogService, EditBuffer, EditError,
    EditFields,
};
