//! Actions accepted by [`Composer::dispatch`](super::Composer::dispatch)
//!
//! Every user interaction maps to one action. A UI layer queues actions and
//! applies them in order, then re-renders from the composer state.

use crate::catalog::OptionValue;
use crate::types::MediaItem;

use super::schedule::ScheduleField;

#[derive(Debug, Clone)]
pub enum ComposerAction {
    // === Channels ===
    AddChannel {
        platform_id: String,
        post_type: Option<String>,
    },
    UpdateChannel {
        platform_id: String,
        post_type: Option<String>,
    },
    RemoveChannel {
        platform_id: String,
    },
    SetChannelsSeparated(bool),

    // === Captions ===
    SetMasterCaption(String),
    EditChannelCaption {
        platform_id: String,
        text: String,
    },
    ApplyCaptionToAll {
        source: String,
    },

    // === Media ===
    AddMasterMedia(Vec<MediaItem>),
    AddMediaToChannel {
        platform_id: String,
        items: Vec<MediaItem>,
    },
    RemoveMediaFromChannel {
        platform_id: String,
        media_id: String,
    },
    ReplaceMasterMedia(Vec<MediaItem>),

    // === Scheduling and options ===
    SetScheduleField {
        platform_id: String,
        field: ScheduleField,
    },
    SetOption {
        platform_id: String,
        field_id: String,
        value: OptionValue,
    },

    /// Throw the whole composition away
    Discard,
}
