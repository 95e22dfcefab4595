//! Ad creative flattening
//!
//! An ad's creative carries its content in `object_story_spec`, which holds
//! `link_data` (a single image or link, or a carousel when it has
//! `child_attachments`) and/or `video_data`. The source normally populates one
//! branch, but both or neither are accepted.

use super::lookup::{array, child, first_present, scalar};
use super::record::{FlatRecord, Scalar};
use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonObject, RawRecord};
use serde_json::Value;
use tracing::debug;

/// Content of a `link_data` object
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkShape<'a> {
    /// Single image or plain link
    Single(&'a JsonObject),
    /// Link with a non-empty list of carousel cards
    Carousel {
        /// The `link_data` object
        link: &'a JsonObject,
        /// The `child_attachments` list
        cards: &'a [Value],
    },
}

impl<'a> LinkShape<'a> {
    fn resolve(link: &'a JsonObject) -> Self {
        match array(Some(link), "child_attachments") {
            Some(cards) if !cards.is_empty() => Self::Carousel { link, cards },
            _ => Self::Single(link),
        }
    }

    /// The underlying `link_data` object
    pub fn data(&self) -> &'a JsonObject {
        match *self {
            Self::Single(link) | Self::Carousel { link, .. } => link,
        }
    }
}

/// Which creative representations a story spec carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativeKind {
    /// No link or video content
    Empty,
    /// Single image or plain link
    Link,
    /// Carousel
    Carousel,
    /// Video
    Video,
    /// Both link and video content
    Mixed,
}

/// Resolved content of an `object_story_spec`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoryContent<'a> {
    /// The story spec itself
    pub spec: Option<&'a JsonObject>,
    /// Link content, if any
    pub link: Option<LinkShape<'a>>,
    /// `video_data`, if any
    pub video: Option<&'a JsonObject>,
}

impl<'a> StoryContent<'a> {
    /// Resolve the content of a story spec
    pub fn resolve(spec: Option<&'a JsonObject>) -> Self {
        Self {
            spec,
            link: child(spec, "link_data").map(LinkShape::resolve),
            video: child(spec, "video_data"),
        }
    }

    /// Classify the content
    pub fn kind(&self) -> CreativeKind {
        match (&self.link, self.video) {
            (None, None) => CreativeKind::Empty,
            (Some(_), Some(_)) => CreativeKind::Mixed,
            (Some(LinkShape::Single(_)), None) => CreativeKind::Link,
            (Some(LinkShape::Carousel { .. }), None) => CreativeKind::Carousel,
            (None, Some(_)) => CreativeKind::Video,
        }
    }

    fn link_data(&self) -> Option<&'a JsonObject> {
        self.link.map(|l| l.data())
    }
}

/// Flatten one ad record into the ad metadata column set
///
/// Missing or differently-typed nested objects yield nulls. Only a record
/// that is not a JSON object is rejected.
pub fn flatten_ad(raw: &RawRecord) -> Result<FlatRecord> {
    let Value::Object(ad) = raw else {
        return Err(Error::contract(format!(
            "ad record must be a JSON object, got {}",
            json_type_name(raw)
        )));
    };
    let ad = Some(ad);

    let adset = child(ad, "adset");
    let campaign = child(ad, "campaign");
    let creative = child(ad, "creative");
    let story = StoryContent::resolve(child(creative, "object_story_spec"));
    let link = story.link_data();

    if story.kind() == CreativeKind::Mixed {
        debug!("Creative carries both link and video content");
    }

    let primary_text = first_present([scalar(story.spec, "message"), scalar(link, "message")]);

    // A present but empty card list still encodes as "[]"
    let cards = array(link, "child_attachments");
    let first_card = cards.and_then(<[Value]>::first).and_then(Value::as_object);
    let carousel_json = match cards {
        Some(cards) => Scalar::Text(serde_json::to_string(cards)?),
        None => Scalar::Null,
    };

    let video = story.video;

    Ok(FlatRecord::from_iter([
        ("ad_id", scalar(ad, "id")),
        ("ad_name", scalar(ad, "name")),
        ("ad_status", scalar(ad, "status")),
        ("ad_effective_status", scalar(ad, "effective_status")),
        ("ad_created_time", scalar(ad, "created_time")),
        ("ad_updated_time", scalar(ad, "updated_time")),
        ("adset_id", scalar(adset, "id")),
        ("adset_name", scalar(adset, "name")),
        ("campaign_id", scalar(campaign, "id")),
        ("campaign_name", scalar(campaign, "name")),
        ("creative_id", scalar(creative, "id")),
        ("creative_name", scalar(creative, "name")),
        ("thumbnail_url", scalar(creative, "thumbnail_url")),
        (
            "effective_object_story_id",
            scalar(creative, "effective_object_story_id"),
        ),
        ("primary_text", primary_text),
        ("headline", scalar(link, "name")),
        ("description", scalar(link, "description")),
        ("display_link", scalar(link, "link")),
        ("caption", scalar(link, "caption")),
        (
            "call_to_action_type",
            scalar(child(link, "call_to_action"), "type"),
        ),
        ("image_hash", scalar(link, "image_hash")),
        ("carousel_headline_first", scalar(first_card, "name")),
        ("carousel_desc_first", scalar(first_card, "description")),
        ("carousel_json", carousel_json),
        ("video_description", scalar(video, "description")),
        (
            "video_call_to_action_type",
            scalar(child(video, "call_to_action"), "type"),
        ),
    ]))
}
