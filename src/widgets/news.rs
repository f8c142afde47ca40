//! News widget: the latest BBC News headlines from the category's RSS feed.
//!
//! # Layout
//!
//! One row per story, [`STORY_GAP`] pixels apart. Each row has the news icon
//! at its origin and up to [`MAX_TITLE_LINES`] lines of the wrapped title to
//! the right of it. Rows that would not fit the bounds height are skipped.

use std::sync::Arc;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

use super::primitives::{draw_news_icon, wrap_lines};
use super::{Provider, WidgetError};
use crate::fetch::Fetch;
use crate::styles::{BODY_FONT, BODY_STYLE, TOP_LEFT};

/// Stories kept from the feed.
pub const MAX_STORIES: usize = 5;

/// Vertical distance between story rows.
pub const STORY_GAP: u32 = 60;

pub const MAX_TITLE_LINES: usize = 2;

/// Left edge of the title text, right of the icon.
const TEXT_INSET: u32 = 55;

const TITLE_TOP: i32 = 5;

const LINE_GAP: i32 = 25;

const FEED_BASE: &str = "http://feeds.bbci.co.uk/news";

/// One feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub title: String,
    pub description: String,
    /// RFC 822 date as published in the feed, kept verbatim.
    pub published: String,
}

pub struct NewsProvider {
    fetch: Arc<dyn Fetch>,
    url: String,
}

impl NewsProvider {
    pub fn new(
        fetch: Arc<dyn Fetch>,
        category: &str,
    ) -> Self {
        Self {
            fetch,
            url: feed_url(category),
        }
    }
}

/// Feed URL for a category; an empty category selects the top stories feed.
pub fn feed_url(category: &str) -> String {
    let category = category.trim_matches('/');
    if category.is_empty() {
        format!("{FEED_BASE}/rss.xml")
    } else {
        format!("{FEED_BASE}/{category}/rss.xml")
    }
}

/// Parse up to [`MAX_STORIES`] `<item>` elements.
///
/// An item without a non-empty `<title>` invalidates the whole feed. Missing
/// descriptions and dates are tolerated.
pub fn parse_feed(xml: &str) -> Result<Vec<Story>, WidgetError> {
    let document = roxmltree::Document::parse(xml).map_err(|e| WidgetError::Parse(format!("invalid RSS: {e}")))?;

    document
        .descendants()
        .filter(|node| node.has_tag_name("item"))
        .take(MAX_STORIES)
        .enumerate()
        .map(|(index, item)| {
            let title = child_text(item, "title")
                .ok_or_else(|| WidgetError::Parse(format!("item {index} has no <title>")))?;
            Ok(Story {
                title,
                description: child_text(item, "description").unwrap_or_default(),
                published: child_text(item, "pubDate").unwrap_or_default(),
            })
        })
        .collect()
}

fn child_text(
    node: roxmltree::Node<'_, '_>,
    name: &str,
) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(name))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

impl Provider for NewsProvider {
    type Data = Vec<Story>;

    const NAME: &'static str = "news";

    fn fetch(&mut self) -> Result<Vec<Story>, WidgetError> {
        let body = self.fetch.fetch_text(&self.url, &[])?;
        parse_feed(&body)
    }

    fn summarize(
        &self,
        data: &Vec<Story>,
    ) -> String {
        format!("{} stories", data.len())
    }

    fn render<D>(
        &self,
        data: &Vec<Story>,
        target: &mut D,
    ) -> Result<(), WidgetError>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let size = target.bounding_box().size;
        let visible = MAX_STORIES.min((size.height / STORY_GAP) as usize);
        let text_width = size.width.saturating_sub(TEXT_INSET);

        for (row, story) in data.iter().take(visible).enumerate() {
            let y = row as i32 * STORY_GAP as i32;
            draw_news_icon(target, Point::new(0, y));

            for (line_index, line) in wrap_lines(&story.title, BODY_FONT, text_width)
                .iter()
                .take(MAX_TITLE_LINES)
                .enumerate()
            {
                let origin = Point::new(TEXT_INSET as i32, y + TITLE_TOP + line_index as i32 * LINE_GAP);
                Text::with_text_style(line, origin, BODY_STYLE, TOP_LEFT)
                    .draw(target)
                    .ok();
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::Rectangle;

    use super::*;
    use crate::canvas::Canvas;
    use crate::config::{SCREEN_SIZE, WIDGET_BOUNDS, slot};
    use crate::fetch::FetchError;
    use crate::testing::FakeFetch;
    use crate::widgets::primitives::draw_error_placeholder;
    use crate::widgets::{ErrorKind, Slot, Widget, WidgetState};

    const WORLD_URL: &str = "http://feeds.bbci.co.uk/news/world/rss.xml";

    fn feed(titles: &[&str]) -> String {
        let items: String = titles
            .iter()
            .map(|t| {
                format!(
                    "<item><title><![CDATA[{t}]]></title><description><![CDATA[About {t}]]></description>\
                     <pubDate>Mon, 19 Oct 2026 08:00:00 GMT</pubDate></item>"
                )
            })
            .collect();
        format!(r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>BBC News</title>{items}</channel></rss>"#)
    }

    fn story(title: &str) -> Story {
        Story {
            title: title.into(),
            description: String::new(),
            published: String::new(),
        }
    }

    /// Ink count of story row `row` inside a target whose origin is `origin`.
    fn row_ink(
        canvas: &Canvas,
        origin: Point,
        row: u32,
    ) -> usize {
        let top = origin + Point::new(0, (row * STORY_GAP) as i32);
        canvas.ink_count(&Rectangle::new(top, Size::new(380, STORY_GAP)))
    }

    // =========================================================================
    // Feed
    // =========================================================================

    #[test]
    fn test_feed_url() {
        assert_eq!(feed_url("world"), WORLD_URL);
        assert_eq!(feed_url(""), "http://feeds.bbci.co.uk/news/rss.xml");
        assert_eq!(feed_url("/technology/"), "http://feeds.bbci.co.uk/news/technology/rss.xml");
    }

    #[test]
    fn test_parse_feed_reads_items() {
        let stories = parse_feed(&feed(&["First", "Second"])).unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].title, "First");
        assert_eq!(stories[0].description, "About First");
        assert_eq!(stories[1].published, "Mon, 19 Oct 2026 08:00:00 GMT");
    }

    #[test]
    fn test_parse_feed_caps_story_count() {
        let titles = ["a", "b", "c", "d", "e", "f", "g"];
        let stories = parse_feed(&feed(&titles)).unwrap();
        assert_eq!(stories.len(), MAX_STORIES);
        assert_eq!(stories[4].title, "e");
    }

    #[test]
    fn test_parse_feed_missing_title_is_parse_error() {
        let xml = "<rss><channel><item><description>x</description></item></channel></rss>";
        let err = parse_feed(xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_feed_malformed_xml_is_parse_error() {
        assert_eq!(parse_feed("<rss><channel>").unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_feed_without_items_is_empty() {
        assert!(parse_feed(&feed(&[])).unwrap().is_empty());
    }

    // =========================================================================
    // Widget
    // =========================================================================

    #[test]
    fn test_three_items_render_three_rows() {
        let fetch = Arc::new(FakeFetch::new().with_text(WORLD_URL, &feed(&["One", "Two", "Three"])));
        let bounds = WIDGET_BOUNDS[slot::NEWS];
        let mut slot = Slot::new(NewsProvider::new(fetch, "world"), bounds);

        slot.update_data();
        assert_eq!(slot.state(), WidgetState::Healthy);
        let titles: Vec<_> = slot.data().unwrap().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);

        let mut canvas = Canvas::new(SCREEN_SIZE);
        slot.draw(&mut canvas);
        for row in 0..3 {
            assert!(row_ink(&canvas, bounds.top_left(), row) > 0, "row {row} empty");
        }
        assert_eq!(row_ink(&canvas, bounds.top_left(), 3), 0);
        assert_eq!(row_ink(&canvas, bounds.top_left(), 4), 0);
    }

    #[test]
    fn test_render_limits_rows_to_cap() {
        let provider = NewsProvider::new(Arc::new(FakeFetch::new()), "world");
        let stories: Vec<_> = (0..7).map(|i| story(&format!("Story {i}"))).collect();

        let mut canvas = Canvas::new(Size::new(380, 600));
        provider.render(&stories, &mut canvas).unwrap();
        for row in 0..5 {
            assert!(row_ink(&canvas, Point::zero(), row) > 0);
        }
        assert_eq!(row_ink(&canvas, Point::zero(), 5), 0);
        assert_eq!(row_ink(&canvas, Point::zero(), 6), 0);
    }

    #[test]
    fn test_render_limits_rows_to_height() {
        let provider = NewsProvider::new(Arc::new(FakeFetch::new()), "world");
        let stories: Vec<_> = (0..5).map(|i| story(&format!("Story {i}"))).collect();

        let mut canvas = Canvas::new(SCREEN_SIZE);
        provider.render(&stories, &mut canvas.region(crate::config::Bounds::new(0, 0, 380, 130))).unwrap();
        assert!(row_ink(&canvas, Point::zero(), 1) > 0);
        assert_eq!(canvas.ink_count(&Rectangle::new(Point::new(0, 120), Size::new(800, 360))), 0);
    }

    #[test]
    fn test_long_title_capped_at_two_lines() {
        let provider = NewsProvider::new(Arc::new(FakeFetch::new()), "world");
        let title = "word ".repeat(60);
        let mut canvas = Canvas::new(Size::new(380, 60));
        provider.render(&vec![story(&title)], &mut canvas).unwrap();

        // Third line would start at 5 + 2 * 25
        let third_line = Rectangle::new(Point::new(TEXT_INSET as i32, 55), Size::new(325, 5));
        assert_eq!(canvas.ink_count(&third_line), 0);
    }

    #[test]
    fn test_failed_fetch_keeps_stories_and_shows_placeholder() {
        let fetch = Arc::new(FakeFetch::new().with_text(WORLD_URL, &feed(&["Kept"])));
        let bounds = WIDGET_BOUNDS[slot::NEWS];
        let mut slot = Slot::new(NewsProvider::new(fetch.clone(), "world"), bounds);
        slot.update_data();

        fetch.fail(WORLD_URL, FetchError::Timeout { url: WORLD_URL.into() });
        slot.update_data();
        assert_eq!(slot.state(), WidgetState::Error);
        assert_eq!(slot.data().map(Vec::len), Some(1));

        let mut canvas = Canvas::new(SCREEN_SIZE);
        slot.draw(&mut canvas);
        let mut expected = Canvas::new(SCREEN_SIZE);
        draw_error_placeholder(&mut expected.region(bounds), ErrorKind::Fetch);
        assert_eq!(canvas, expected);
    }
}
