//! Renders locators into Scrapy selector expressions.
//!
//! The expressions are the part following `response.` or `elem.` in the
//! generated parser, e.g. `css('h1::text')` or `xpath('//a/@href')`.

use crate::code::quote_single;
use crate::config::{Field, Locator, SelectorKind, Stage};
use crate::error::{Error, LocatorTarget};

/// Attribute read from pagination links when none is configured.
pub const DEFAULT_PAGE_ATTR: &str = "href";

/// Renders `locator`, extracting `attr` when given and the text content otherwise.
///
/// Returns `None` when the locator has neither a CSS nor an XPath expression.
pub fn render(locator: &Locator) -> Option<String> {
    locator
        .kind()
        .map(|kind| render_kind(kind, locator.attr()))
}

/// Extraction expression for one configured field.
pub fn field_expression(stage: &Stage, field: &Field) -> Result<String, Error> {
    render(&field.locator).ok_or_else(|| Error::InvalidLocator {
        stage: stage.name.clone(),
        target: LocatorTarget::Field(field.name.clone()),
    })
}

/// Expression selecting the elements iterated by a list stage.
pub fn list_expression(stage: &Stage) -> Result<String, Error> {
    let locator = stage
        .list_locator
        .as_ref()
        .ok_or_else(|| Error::MissingListLocator {
            stage: stage.name.clone(),
        })?;

    match locator.kind() {
        Some(SelectorKind::Css(css)) => Ok(format!("css('{}')", quote_single(css))),
        Some(SelectorKind::XPath(xpath)) => Ok(format!("xpath('{}')", quote_single(xpath))),
        None => Err(Error::InvalidLocator {
            stage: stage.name.clone(),
            target: LocatorTarget::List,
        }),
    }
}

/// Expression extracting the next page link, or `None` when the stage is not paginated.
///
/// The attribute is always extracted: `page_attr` first, then the locator's own
/// attribute, then [`DEFAULT_PAGE_ATTR`].
pub fn page_expression(stage: &Stage) -> Result<Option<String>, Error> {
    let Some(locator) = &stage.page_locator else {
        return Ok(None);
    };

    let attr = stage
        .page_attr()
        .or_else(|| locator.attr())
        .unwrap_or(DEFAULT_PAGE_ATTR);

    locator
        .kind()
        .map(|kind| Some(render_kind(kind, Some(attr))))
        .ok_or_else(|| Error::InvalidLocator {
            stage: stage.name.clone(),
            target: LocatorTarget::Page,
        })
}

fn render_kind(kind: SelectorKind<'_>, attr: Option<&str>) -> String {
    match (kind, attr) {
        (SelectorKind::Css(css), Some(attr)) => format!(
            "css('{}::attr(\"{}\")')",
            quote_single(css),
            quote_single(attr)
        ),
        (SelectorKind::Css(css), None) => format!("css('{}::text')", quote_single(css)),
        (SelectorKind::XPath(xpath), Some(attr)) => {
            format!("xpath('{}/@{}')", quote_single(xpath), quote_single(attr))
        }
        (SelectorKind::XPath(xpath), None) => format!("xpath('string({})')", quote_single(xpath)),
    }
}
