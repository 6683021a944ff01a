//! Best-effort field extraction from loosely shaped post payloads.
//!
//! The same post can reach us as a bare record (`getRecord`), a post view
//! (`getPostThread`, `getQuotes`) or something in between, so every accessor
//! here probes a fixed list of paths and falls back to a sentinel rather than
//! failing.

use skythread_common::types::Data;
use smol_str::SmolStr;

/// Shown when no text field could be found.
pub const NO_TEXT_CONTENT: &str = "No text content";
/// Shown when no timestamp could be found.
pub const UNKNOWN_TIME: &str = "Unknown time";
/// Shown for images without alt text.
pub const NO_DESCRIPTION: &str = "No description";

/// Paths probed for post text, in priority order.
const TEXT_PATHS: &[&[&str]] = &[
    &["text"],
    &["record", "text"],
    &["record", "value", "text"],
    &["record", "value", "content"],
    &["value", "text"],
    &["value", "content"],
];

const TIME_PATHS: &[&[&str]] = &[
    &["createdAt"],
    &["indexedAt"],
    &["record", "createdAt"],
];

fn non_empty<'a>(data: &'a Data, path: &[&str]) -> Option<&'a str> {
    data.str_at(path).filter(|s| !s.is_empty())
}

/// First non-empty text field, if any.
pub fn find_text(record: &Data) -> Option<&str> {
    TEXT_PATHS.iter().find_map(|path| non_empty(record, path))
}

/// Post text, or [`NO_TEXT_CONTENT`]. Never empty.
pub fn extract_text(record: &Data) -> &str {
    find_text(record).unwrap_or(NO_TEXT_CONTENT)
}

/// Creation (or indexing) timestamp as given, or [`UNKNOWN_TIME`].
pub fn created_at(record: &Data) -> &str {
    TIME_PATHS
        .iter()
        .find_map(|path| non_empty(record, path))
        .unwrap_or(UNKNOWN_TIME)
}

/// An image attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Alt text, if the author wrote any
    pub alt: Option<SmolStr>,
    /// Blob CID or URL; `None` if the entry carried neither
    pub reference: Option<SmolStr>,
}

impl ImageRef {
    /// Alt text or [`NO_DESCRIPTION`].
    pub fn alt_text(&self) -> &str {
        self.alt.as_deref().unwrap_or(NO_DESCRIPTION)
    }

    fn from_embed(image: &Data) -> Self {
        Self {
            alt: non_empty(image, &["alt"]).map(SmolStr::new),
            reference: non_empty(image, &["image", "ref", "$link"]).map(SmolStr::new),
        }
    }
}

/// Every image attached to a record.
///
/// Looks at `embed.images`, `embed.media.images` (record-with-media embeds)
/// and a `media` list of `{type: "image", url}` entries, in that order.
pub fn extract_images(record: &Data) -> Vec<ImageRef> {
    let embedded = [&["embed", "images"][..], &["embed", "media", "images"][..]]
        .into_iter()
        .filter_map(|path| record.array_at(path))
        .flatten()
        .map(ImageRef::from_embed);

    let media = record
        .array_at(&["media"])
        .unwrap_or_default()
        .iter()
        .filter(|m| m.str_at(&["type"]) == Some("image"))
        .map(|m| ImageRef {
            alt: non_empty(m, &["alt"]).map(SmolStr::new),
            reference: non_empty(m, &["url"]).map(SmolStr::new),
        });

    embedded.chain(media).collect()
}

/// Parent and root of a reply. Both absent for top-level posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyLinks {
    /// URI of the post being replied to
    pub parent: Option<SmolStr>,
    /// URI of the first post of the thread
    pub root: Option<SmolStr>,
}

impl ReplyLinks {
    /// Neither link is known.
    pub fn is_empty(&self) -> bool {
        self.parent.is_none() && self.root.is_none()
    }

    /// Fill missing links from `other`.
    pub fn or(self, other: ReplyLinks) -> ReplyLinks {
        ReplyLinks {
            parent: self.parent.or(other.parent),
            root: self.root.or(other.root),
        }
    }

    /// The root, only when it is a different post from the parent.
    pub fn distinct_root(&self) -> Option<&str> {
        self.root
            .as_deref()
            .filter(|root| self.parent.as_deref() != Some(*root))
    }
}

/// Reply links from a record's `reply` (or `record.reply`) object.
pub fn extract_reply_links(record: &Data) -> ReplyLinks {
    let Some(reply) = [&["reply"][..], &["record", "reply"][..]]
        .into_iter()
        .filter_map(|path| record.get_path(path))
        .find(|reply| reply.as_object().is_some())
    else {
        return ReplyLinks::default();
    };
    ReplyLinks {
        parent: non_empty(reply, &["parent", "uri"]).map(SmolStr::new),
        root: non_empty(reply, &["root", "uri"]).map(SmolStr::new),
    }
}

/// URI of a thread node, whether it is a full view (`post.uri`) or a
/// placeholder (`uri`).
fn node_uri(node: &Data) -> Option<SmolStr> {
    non_empty(node, &["uri"])
        .or_else(|| non_empty(node, &["post", "uri"]))
        .map(SmolStr::new)
}

/// Reply links as seen from a `getPostThread` response.
pub fn thread_links(thread: &Data) -> ReplyLinks {
    let direct = ReplyLinks {
        parent: thread.get("parent").and_then(node_uri),
        root: thread.get("root").and_then(node_uri),
    };
    match thread.get("post") {
        Some(post) => direct.or(extract_reply_links(post)),
        None => direct,
    }
}

/// Direct replies of a thread node (`replies`, or `children` on older views).
pub fn thread_replies(thread: &Data) -> &[Data] {
    thread
        .array_at(&["replies"])
        .or_else(|| thread.array_at(&["children"]))
        .unwrap_or_default()
}

/// Author of a post or like, as much as the view tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorView {
    pub did: Option<SmolStr>,
    pub handle: Option<SmolStr>,
    pub display_name: Option<SmolStr>,
}

impl AuthorView {
    /// Read a profile view (`did`, `handle`, `displayName`).
    pub fn from_data(data: &Data) -> Self {
        Self {
            did: non_empty(data, &["did"]).map(SmolStr::new),
            handle: non_empty(data, &["handle"]).map(SmolStr::new),
            display_name: non_empty(data, &["displayName"]).map(SmolStr::new),
        }
    }

    /// `Name (@handle)`, `@handle`, the DID, or `Unknown`.
    pub fn label(&self) -> String {
        match (&self.display_name, &self.handle, &self.did) {
            (Some(name), Some(handle), _) => format!("{name} (@{handle})"),
            (None, Some(handle), _) => format!("@{handle}"),
            (_, None, Some(did)) => did.to_string(),
            (_, None, None) => "Unknown".to_owned(),
        }
    }
}

/// Why a reply in a thread has no post view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// Deleted or never existed
    NotFound,
    /// Hidden by a block
    Blocked,
    /// Some other shape we do not understand
    Unknown,
}

impl Unavailable {
    pub fn describe(self) -> &'static str {
        match self {
            Self::NotFound => "post not found",
            Self::Blocked => "post blocked",
            Self::Unknown => "post unavailable",
        }
    }
}

/// One entry in a list of replies or quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyView {
    /// URI of the post, if known
    pub uri: Option<SmolStr>,
    pub author: AuthorView,
    pub created_at: SmolStr,
    pub text: SmolStr,
    /// Set when the thread only holds a placeholder for this reply
    pub unavailable: Option<Unavailable>,
}

impl ReplyView {
    /// Read a thread node: a `threadViewPost` wrapping a post view, or a
    /// `notFoundPost` / `blockedPost` placeholder.
    pub fn from_data(node: &Data) -> Self {
        if let Some(post) = node.get("post") {
            return Self::from_post(post);
        }
        let unavailable = if node.get("notFound").and_then(Data::as_bool) == Some(true) {
            Unavailable::NotFound
        } else if node.get("blocked").and_then(Data::as_bool) == Some(true) {
            Unavailable::Blocked
        } else {
            Unavailable::Unknown
        };
        Self {
            uri: node_uri(node),
            author: AuthorView::default(),
            created_at: SmolStr::new_static(UNKNOWN_TIME),
            text: SmolStr::new_static(NO_TEXT_CONTENT),
            unavailable: Some(unavailable),
        }
    }

    /// Read a bare post view (as returned by `getQuotes`).
    pub fn from_post(post: &Data) -> Self {
        Self {
            uri: non_empty(post, &["uri"]).map(SmolStr::new),
            author: post.get("author").map(AuthorView::from_data).unwrap_or_default(),
            created_at: SmolStr::new(created_at(post)),
            text: SmolStr::new(extract_text(post)),
            unavailable: None,
        }
    }
}

/// One like of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeView {
    pub actor: AuthorView,
    pub created_at: SmolStr,
}

impl LikeView {
    /// Read a `getLikes` entry (`actor`, `createdAt`, `indexedAt`).
    pub fn from_data(like: &Data) -> Self {
        Self {
            actor: like.get("actor").map(AuthorView::from_data).unwrap_or_default(),
            created_at: SmolStr::new(created_at(like)),
        }
    }
}
