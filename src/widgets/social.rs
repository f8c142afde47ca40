//! Social feed widget: the newest original post of one Twitter account.
//!
//! # Fetch Sequence
//!
//! 1. Resolve the configured screen name to a user id, display name and
//!    full-size avatar URL (v1.1 `users/lookup`). Cached after the first
//!    success; retried every cycle until it succeeds.
//! 2. Fetch the latest post without replies or retweets (v2
//!    `users/:id/tweets`) and take the first entry.
//! 3. Format the post date, download and convert the avatar.
//!
//! The card is only replaced when all steps succeed, so a failure anywhere
//! leaves the previous card intact.
//!
//! # Layout
//!
//! ```text
//! ┌────────┐ Display Name
//! │ avatar │ @handle
//! └────────┘
//! Post text, wrapped to the full width, switching to the compact font
//! when the body font would need more than MAX_LINES lines.
//! ───────────────────────────────────────────
//!  ♥ 1.2K   ▭ 56   09:41 March 07, 2026
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use serde::Deserialize;

use super::avatar::{AVATAR_SIZE, Avatar};
use super::primitives::{draw_divider, draw_heart_icon, draw_speech_icon, format_count, wrap_lines};
use super::{Provider, WidgetError};
use crate::config::SocialSettings;
use crate::fetch::{Fetch, fetch_json};
use crate::styles::{BODY_FONT, BODY_STYLE, COMPACT_FONT, COMPACT_STYLE, HEADLINE_STYLE, TOP_LEFT, text_width};

const API_BASE: &str = "https://api.twitter.com";

/// Body-font lines allowed before switching to the compact font.
pub const MAX_LINES: usize = 7;

/// Hard cap on compact-font lines.
pub const MAX_COMPACT_LINES: usize = 12;

// Layout, relative to the widget origin
const ROOT_Y: i32 = 5;
const HEADER_X: i32 = AVATAR_SIZE as i32 + 10;
const NAME_Y: i32 = ROOT_Y + 10;
const HANDLE_Y: i32 = ROOT_Y + 40;
const PARAGRAPH_Y: i32 = ROOT_Y + 75;
const BODY_LINE_GAP: u32 = 25;
const COMPACT_LINE_GAP: u32 = 20;
const DIVIDER_GAP: i32 = 5;
const STATS_GAP: i32 = 10;
const HEART_X: i32 = 10;
const LIKES_X: i32 = 40;
const SPEECH_X: i32 = 95;
const REPLIES_X: i32 = 127;
const DATE_X: i32 = AVATAR_SIZE as i32 + 120;

/// Space below the paragraph: divider, stats row and a possible date row.
const FOOTER_HEIGHT: u32 = (DIVIDER_GAP + STATS_GAP) as u32 + 2 * COMPACT_LINE_GAP;

// =============================================================================
// API payloads
// =============================================================================

#[derive(Debug, Deserialize)]
struct LookupUser {
    id_str: String,
    name: String,
    screen_name: String,
    profile_image_url_https: String,
}

#[derive(Debug, Deserialize)]
struct TweetsResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    text: String,
    created_at: String,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

/// Engagement counters of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublicMetrics {
    pub retweet_count: u64,
    pub reply_count: u64,
    pub like_count: u64,
    pub quote_count: u64,
}

// =============================================================================
// Content
// =============================================================================

/// Resolved account, cached for the lifetime of the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub screen_name: String,
    /// Full-size avatar URL (`_normal` size suffix removed).
    pub image_url: String,
}

/// Everything needed to draw the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialCard {
    pub name: String,
    pub screen_name: String,
    pub text: String,
    pub metrics: PublicMetrics,
    /// `HH:MM Month DD, YYYY` in UTC.
    pub display_date: String,
    pub avatar: Avatar,
}

pub struct SocialFeedProvider {
    fetch: Arc<dyn Fetch>,
    bearer_token: String,
    screen_name: String,
    identity: Option<Identity>,
}

impl SocialFeedProvider {
    pub fn new(
        fetch: Arc<dyn Fetch>,
        settings: &SocialSettings,
    ) -> Self {
        Self {
            fetch,
            bearer_token: settings.bearer_token.clone(),
            screen_name: settings.screen_name.clone(),
            identity: None,
        }
    }

    pub const fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }

    fn api_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, WidgetError> {
        let authorization = format!("Bearer {}", self.bearer_token);
        fetch_json(self.fetch.as_ref(), url, &[("Authorization", authorization.as_str())])
    }

    fn resolve(&self) -> Result<Identity, WidgetError> {
        let url = lookup_url(&self.screen_name);
        let users: Vec<LookupUser> = self.api_json(&url)?;
        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| WidgetError::Parse(format!("no user named '{}'", self.screen_name)))?;

        Ok(Identity {
            id: user.id_str,
            name: user.name,
            screen_name: user.screen_name,
            image_url: user.profile_image_url_https.replace("_normal", ""),
        })
    }
}

pub fn lookup_url(screen_name: &str) -> String { format!("{API_BASE}/1.1/users/lookup.json?screen_name={screen_name}") }

pub fn tweets_url(user_id: &str) -> String {
    format!("{API_BASE}/2/users/{user_id}/tweets?exclude=replies,retweets&tweet.fields=created_at,public_metrics")
}

/// Reformat an RFC 3339 timestamp as `HH:MM Month DD, YYYY` (UTC).
pub fn display_date(created_at: &str) -> Result<String, WidgetError> {
    let parsed = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| WidgetError::Parse(format!("created_at '{created_at}': {e}")))?;
    Ok(parsed.with_timezone(&Utc).format("%H:%M %B %d, %Y").to_string())
}

impl Provider for SocialFeedProvider {
    type Data = SocialCard;

    const NAME: &'static str = "social";

    fn fetch(&mut self) -> Result<SocialCard, WidgetError> {
        let identity = match &self.identity {
            Some(identity) => identity.clone(),
            None => {
                let identity = self.resolve()?;
                tracing::info!(id = %identity.id, screen_name = %identity.screen_name, "social: resolved account");
                self.identity = Some(identity.clone());
                identity
            }
        };

        let response: TweetsResponse = self.api_json(&tweets_url(&identity.id))?;
        let tweet = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| WidgetError::Parse(format!("@{} has no posts", identity.screen_name)))?;
        let display_date = display_date(&tweet.created_at)?;

        // The avatar can change, so it is fetched every cycle
        let image = self.fetch.fetch_bytes(&identity.image_url, &[])?;
        let avatar = Avatar::from_image_bytes(&image)?;

        Ok(SocialCard {
            name: identity.name,
            screen_name: identity.screen_name,
            text: tweet.text,
            metrics: tweet.public_metrics,
            display_date,
            avatar,
        })
    }

    fn summarize(
        &self,
        card: &SocialCard,
    ) -> String {
        format!(
            "@{} {} likes, {} replies, posted {}",
            card.screen_name, card.metrics.like_count, card.metrics.reply_count, card.display_date
        )
    }

    fn render<D>(
        &self,
        card: &SocialCard,
        target: &mut D,
    ) -> Result<(), WidgetError>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let size = target.bounding_box().size;
        let min_height = PARAGRAPH_Y as u32 + BODY_LINE_GAP + FOOTER_HEIGHT;
        if size.width < AVATAR_SIZE * 2 || size.height < min_height {
            return Err(WidgetError::Draw(format!("{size:?} too small for a post card")));
        }

        // Header
        card.avatar.draw(target, Point::new(0, ROOT_Y));
        Text::with_text_style(&card.name, Point::new(HEADER_X, NAME_Y), HEADLINE_STYLE, TOP_LEFT)
            .draw(target)
            .ok();
        let handle = format!("@{}", card.screen_name);
        Text::with_text_style(&handle, Point::new(HEADER_X, HANDLE_Y), BODY_STYLE, TOP_LEFT)
            .draw(target)
            .ok();

        // Paragraph
        let paragraph_room = size.height - PARAGRAPH_Y as u32 - FOOTER_HEIGHT;
        let paragraph = Paragraph::layout(&card.text, size.width, paragraph_room);
        for (index, line) in paragraph.lines.iter().enumerate() {
            let y = PARAGRAPH_Y + (index as u32 * paragraph.line_gap) as i32;
            Text::with_text_style(line, Point::new(0, y), paragraph.style, TOP_LEFT)
                .draw(target)
                .ok();
        }

        // Footer
        let divider_y = PARAGRAPH_Y + paragraph.height() as i32 + DIVIDER_GAP;
        draw_divider(target, Point::new(0, divider_y), size.width);

        let stats_y = divider_y + STATS_GAP;
        draw_heart_icon(target, Point::new(HEART_X, stats_y - 3));
        Text::with_text_style(
            &format_count(card.metrics.like_count),
            Point::new(LIKES_X, stats_y),
            COMPACT_STYLE,
            TOP_LEFT,
        )
        .draw(target)
        .ok();
        draw_speech_icon(target, Point::new(SPEECH_X, stats_y - 1));
        Text::with_text_style(
            &format_count(card.metrics.reply_count),
            Point::new(REPLIES_X, stats_y),
            COMPACT_STYLE,
            TOP_LEFT,
        )
        .draw(target)
        .ok();

        // The date goes on its own row when it would run past the right edge
        let date_width = text_width(COMPACT_FONT, card.display_date.chars().count());
        let date_origin = if DATE_X as u32 + date_width <= size.width {
            Point::new(DATE_X, stats_y)
        } else {
            Point::new(HEART_X, stats_y + COMPACT_LINE_GAP as i32)
        };
        Text::with_text_style(&card.display_date, date_origin, COMPACT_STYLE, TOP_LEFT)
            .draw(target)
            .ok();

        Ok(())
    }
}

/// Wrapped post text with the font chosen for its length.
struct Paragraph {
    lines: Vec<String>,
    style: MonoTextStyle<'static, BinaryColor>,
    line_gap: u32,
}

impl Paragraph {
    /// Wrap `text` to `width`, then drop lines that exceed the cap for the
    /// chosen font or the `room` available in height.
    fn layout(
        text: &str,
        width: u32,
        room: u32,
    ) -> Self {
        let body = wrap_lines(text, BODY_FONT, width);
        let (mut lines, style, line_gap, cap) = if body.len() > MAX_LINES {
            (wrap_lines(text, COMPACT_FONT, width), COMPACT_STYLE, COMPACT_LINE_GAP, MAX_COMPACT_LINES)
        } else {
            (body, BODY_STYLE, BODY_LINE_GAP, MAX_LINES)
        };
        lines.truncate(cap.min((room / line_gap) as usize));
        Self { lines, style, line_gap }
    }

    fn height(&self) -> u32 { self.lines.len() as u32 * self.line_gap }
}

// =============================================================================
// Unit Tests
// =============================================================================
