use crate::core::display::{format_date, format_time, NO_PUBLICATION_DATE};
use crate::core::metadata::{parse_authors, parse_feeds, MetadataRecord, MetadataUpdate};

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("invalid feeds payload: {0}")]
    Feeds(#[source] serde_json::Error),
    #[error("invalid authors payload: {0}")]
    Authors(#[source] serde_json::Error),
}

/// The editable form fields. Date and time are the split display forms of
/// the combined `publicationDate`; feeds and authors stay JSON text until
/// submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFields {
    pub title: String,
    pub publication_date: String,
    pub publication_time: String,
    pub image_url: String,
    pub feeds: String,
    pub authors: String,
}

/// Working copy of a record under edit plus the pristine snapshot used to
/// detect no-op submissions.
#[derive(Debug, Clone)]
pub struct EditBuffer {
    record: MetadataRecord,
    pub fields: EditFields,
    snapshot: EditFields,
}

impl EditBuffer {
    pub fn new(record: MetadataRecord) -> Self {
        let date_time = record.publication_date.as_deref().unwrap_or_default();
        let fields = EditFields {
            title: record.title.clone(),
            publication_date: format_date(date_time),
            publication_time: format_time(date_time),
            image_url: record.image_url.clone().unwrap_or_default(),
            feeds: record.feeds.clone(),
            authors: record.authors.clone(),
        };
        Self {
            snapshot: fields.clone(),
            fields,
            record,
        }
    }

    pub fn record_id(&self) -> i64 {
        self.record.id
    }

    /// Only title, date, time and image URL count for change detection.
    pub fn is_dirty(&self) -> bool {
        self.fields.title != self.snapshot.title
            || self.fields.publication_date != self.snapshot.publication_date
            || self.fields.publication_time != self.snapshot.publication_time
            || self.fields.image_url != self.snapshot.image_url
    }

    /// Rejoins date and time and decodes the feeds/authors text. A decode
    /// failure leaves the buffer untouched so the operator can correct it.
    pub fn build_update(&self) -> Result<MetadataUpdate, EditError> {
        let feeds = parse_feeds(&self.fields.feeds).map_err(EditError::Feeds)?;
        let authors = parse_authors(&self.fields.authors).map_err(EditError::Authors)?;
        Ok(MetadataUpdate {
            id: self.record.id,
            title: self.fields.title.clone(),
            publication_date: self.joined_date_time(),
            image_url: if self.fields.image_url.is_empty() {
                None
            } else {
                Some(self.fields.image_url.clone())
            },
            feeds,
            authors,
            active: self.record.active.clone(),
        })
    }

    // Date and time rejoin only when both are genuinely present; the
    // sentinel date field keeps the record's original value.
    fn joined_date_time(&self) -> Option<String> {
        let date = self.fields.publication_date.trim();
        let time = self.fields.publication_time.trim();
        if date.is_empty() || date == NO_PUBLICATION_DATE || time.is_empty() {
            return self.record.publication_date.clone();
        }
        Some(format!("{date}T{time}"))
    }
}
