//! Emits the generated `parse_<stage>` callbacks.
//!
//! Every stage is rendered by one of four strategies picked from the pair
//! (`is_list`, `content_extraction_mode`). All of them share the same shape:
//! acquire an item, assign the extracted fields, then either chain a request
//! to the next stage or yield the item. List strategies additionally iterate
//! the selected elements, carry the previous stage's item forward and may
//! follow a pagination link back into the same callback.

use crate::code::{CodeBuffer, quote_single};
use crate::config::{Config, Field, Stage, callback_name};
use crate::error::Error;
use crate::fields::is_canonical;
use crate::selector;

/// Name of the field the dedup guard checks in content-extraction list stages.
pub const DEDUP_FIELD: &str = "url";

const DEF_LEVEL: usize = 1;
const BODY_LEVEL: usize = 2;
const LOOP_LEVEL: usize = 3;

/// Canonical fields assigned from the content extraction result.
const ARTICLE_ASSIGNMENTS: [(&str, &str); 8] = [
    ("title", "article.title"),
    ("content", "article.cleaned_text"),
    ("raw_html", "article.raw_html"),
    ("publish_datetime_utc", "article.publish_datetime_utc"),
    ("tags", "article.tags"),
    ("publish_date", "article.publish_date"),
    ("title_zh", "None"),
    ("content_zh", "None"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ParserStrategy {
    /// Single record, configured fields.
    Detail,
    /// Single record, canonical fields from content extraction.
    ContentDetail,
    /// Element list, configured fields.
    List,
    /// Element list, configured fields, already seen URLs skipped.
    UniqueList,
}

impl ParserStrategy {
    pub fn select(stage: &Stage, config: &Config) -> Self {
        match (stage.is_list, config.content_extraction_mode) {
            (false, false) => ParserStrategy::Detail,
            (false, true) => ParserStrategy::ContentDetail,
            (true, false) => ParserStrategy::List,
            (true, true) => ParserStrategy::UniqueList,
        }
    }
}

/// Emits the full parser function for `stage`.
pub fn emit(stage: &Stage, config: &Config) -> Result<String, Error> {
    let strategy = ParserStrategy::select(stage, config);
    tracing::debug!(stage = %stage.name, %strategy, "Emitting parser");

    StageEmitter::new(stage, config).emit(strategy)
}

/// The single field whose value leads to the next stage, if any.
pub fn chain_field(stage: &Stage) -> Result<Option<&Field>, Error> {
    let mut chain_fields = stage.chain_fields();
    let first = chain_fields.next();

    if chain_fields.next().is_some() {
        return Err(Error::AmbiguousChain {
            stage: stage.name.clone(),
            fields: stage.chain_fields().map(|f| f.name.clone()).collect(),
        });
    }

    Ok(first)
}

struct StageEmitter<'a> {
    stage: &'a Stage,
    config: &'a Config,
    code: CodeBuffer,
}

impl<'a> StageEmitter<'a> {
    fn new(stage: &'a Stage, config: &'a Config) -> Self {
        Self {
            stage,
            config,
            code: CodeBuffer::new(),
        }
    }

    fn emit(mut self, strategy: ParserStrategy) -> Result<String, Error> {
        // Fail before writing anything if the terminal action is ambiguous.
        let chain = chain_field(self.stage)?;

        self.code.line(
            DEF_LEVEL,
            format!("def {}(self, response):", self.stage.callback()),
        );

        match strategy {
            ParserStrategy::Detail => self.emit_detail(chain)?,
            ParserStrategy::ContentDetail => self.emit_content_detail(chain)?,
            ParserStrategy::List => self.emit_list(chain, false)?,
            ParserStrategy::UniqueList => self.emit_list(chain, true)?,
        }

        self.code.blank();
        Ok(self.code.into_string())
    }

    fn emit_detail(&mut self, chain: Option<&Field>) -> Result<(), Error> {
        let stage = self.stage;
        self.emit_item_from_meta();
        for field in &stage.fields {
            self.emit_assignment(BODY_LEVEL, "response", field)?;
        }
        self.emit_terminal(BODY_LEVEL, chain);
        Ok(())
    }

    fn emit_content_detail(&mut self, chain: Option<&Field>) -> Result<(), Error> {
        self.emit_item_from_meta();
        self.code
            .line(BODY_LEVEL, "article = goose.extract(raw_html=response.text)");
        for (name, value) in ARTICLE_ASSIGNMENTS {
            self.code
                .line(BODY_LEVEL, format!("item['{}'] = {}", name, value));
        }
        // Canonical names come from the extraction result; their locators are ignored.
        let stage = self.stage;
        for field in stage.fields.iter().filter(|f| !is_canonical(&f.name)) {
            self.emit_assignment(BODY_LEVEL, "response", field)?;
        }
        self.emit_terminal(BODY_LEVEL, chain);
        Ok(())
    }

    fn emit_list(&mut self, chain: Option<&Field>, skip_seen: bool) -> Result<(), Error> {
        let list = selector::list_expression(self.stage)?;
        let page = selector::page_expression(self.stage)?;

        self.code
            .line(BODY_LEVEL, "prev_item = response.meta.get('item')")
            .line(BODY_LEVEL, format!("for elem in response.{}:", list));

        if skip_seen {
            self.emit_dedup_guard()?;
        }

        let stage = self.stage;
        self.code.line(LOOP_LEVEL, "item = Item()");
        for field in &stage.fields {
            self.emit_assignment(LOOP_LEVEL, "elem", field)?;
        }

        // Carry-forward runs after the assignments and never overwrites them.
        self.code
            .line(LOOP_LEVEL, "if prev_item is not None:")
            .line(LOOP_LEVEL + 1, "for key, value in prev_item.items():")
            .line(LOOP_LEVEL + 2, "if key not in item:")
            .line(LOOP_LEVEL + 3, "item[key] = value");

        self.emit_terminal(LOOP_LEVEL, chain);

        if let Some(page) = page {
            self.code
                .line(
                    BODY_LEVEL,
                    format!("next_url = response.{}.extract_first()", page),
                )
                .line(BODY_LEVEL, "if next_url is not None:")
                .line(
                    BODY_LEVEL + 1,
                    format!(
                        "yield scrapy.Request(url=get_real_url(response, next_url), callback=self.{}, meta={{'item': prev_item}})",
                        self.stage.callback()
                    ),
                );
        }

        Ok(())
    }

    fn emit_dedup_guard(&mut self) -> Result<(), Error> {
        let stage = self.stage;
        let check = self.config.dedup_scope.check_function();
        if let Some(field) = stage.fields.iter().find(|f| f.name == DEDUP_FIELD) {
            let expression = selector::field_expression(stage, field)?;
            self.code
                .line(
                    LOOP_LEVEL,
                    format!("{} = elem.{}.extract_first()", DEDUP_FIELD, expression),
                )
                .line(LOOP_LEVEL, format!("if {}({}):", check, DEDUP_FIELD))
                .line(LOOP_LEVEL + 1, "continue");
        }
        Ok(())
    }

    fn emit_item_from_meta(&mut self) {
        self.code.line(
            BODY_LEVEL,
            "item = Item() if response.meta.get('item') is None else response.meta.get('item')",
        );
    }

    fn emit_assignment(&mut self, level: usize, source: &str, field: &Field) -> Result<(), Error> {
        let expression = selector::field_expression(self.stage, field)?;
        self.code.line(
            level,
            format!(
                "item['{}'] = {}.{}.extract_first()",
                quote_single(&field.name),
                source,
                expression
            ),
        );
        Ok(())
    }

    fn emit_terminal(&mut self, level: usize, chain: Option<&Field>) {
        match chain.and_then(|field| field.next_stage().map(|next| (field, next))) {
            Some((field, next)) => {
                self.code.line(
                    level,
                    format!(
                        "yield scrapy.Request(url=get_real_url(response, item['{}']), callback=self.{}, meta={{'item': item}})",
                        quote_single(&field.name),
                        callback_name(next)
                    ),
                );
            }
            None => {
                self.code.line(level, "yield item");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DedupScope, Locator};
    use rstest::rstest;

    fn field(name: &str, locator: Locator) -> Field {
        Field {
            name: name.to_string(),
            locator,
            next_stage: None,
        }
    }

    fn chained(name: &str, locator: Locator, next: &str) -> Field {
        Field {
            next_stage: Some(next.to_string()),
            ..field(name, locator)
        }
    }

    fn list_stage() -> Stage {
        Stage {
            name: "list".to_string(),
            is_list: true,
            list_locator: Some(Locator::css("tr.row")),
            fields: vec![chained("url", Locator::css("a").with_attr("href"), "detail")],
            ..Default::default()
        }
    }

    fn detail_stage() -> Stage {
        Stage {
            name: "detail".to_string(),
            fields: vec![
                field("title", Locator::css("h1")),
                field("body", Locator::xpath("//div[@id='body']")),
            ],
            ..Default::default()
        }
    }

    fn config(content_extraction_mode: bool) -> Config {
        Config {
            content_extraction_mode,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(false, false, ParserStrategy::Detail)]
    #[case(false, true, ParserStrategy::ContentDetail)]
    #[case(true, false, ParserStrategy::List)]
    #[case(true, true, ParserStrategy::UniqueList)]
    fn test_select_strategy(
        #[case] is_list: bool,
        #[case] content_extraction_mode: bool,
        #[case] expected: ParserStrategy,
    ) {
        let stage = Stage {
            is_list,
            ..Default::default()
        };
        assert_eq!(
            ParserStrategy::select(&stage, &config(content_extraction_mode)),
            expected
        );
    }

    #[test]
    fn test_emit_detail() {
        assert_eq!(
            emit(&detail_stage(), &config(false)).unwrap(),
            "    def parse_detail(self, response):
        item = Item() if response.meta.get('item') is None else response.meta.get('item')
        item['title'] = response.css('h1::text').extract_first()
        item['body'] = response.xpath('string(//div[@id=\\'body\\'])').extract_first()
        yield item

"
        );
    }

    #[test]
    fn test_emit_detail_with_chain() {
        let stage = Stage {
            name: "category".to_string(),
            fields: vec![
                field("category", Locator::css("h2")),
                chained("link", Locator::xpath("//a[1]").with_attr("href"), "list"),
            ],
            ..Default::default()
        };

        assert_eq!(
            emit(&stage, &config(false)).unwrap(),
            "    def parse_category(self, response):
        item = Item() if response.meta.get('item') is None else response.meta.get('item')
        item['category'] = response.css('h2::text').extract_first()
        item['link'] = response.xpath('//a[1]/@href').extract_first()
        yield scrapy.Request(url=get_real_url(response, item['link']), callback=self.parse_list, meta={'item': item})

"
        );
    }

    #[test]
    fn test_emit_content_detail() {
        let mut stage = detail_stage();
        stage.fields.push(field("author", Locator::css("span.author")));

        assert_eq!(
            emit(&stage, &config(true)).unwrap(),
            "    def parse_detail(self, response):
        item = Item() if response.meta.get('item') is None else response.meta.get('item')
        article = goose.extract(raw_html=response.text)
        item['title'] = article.title
        item['content'] = article.cleaned_text
        item['raw_html'] = article.raw_html
        item['publish_datetime_utc'] = article.publish_datetime_utc
        item['tags'] = article.tags
        item['publish_date'] = article.publish_date
        item['title_zh'] = None
        item['content_zh'] = None
        item['body'] = response.xpath('string(//div[@id=\\'body\\'])').extract_first()
        item['author'] = response.css('span.author::text').extract_first()
        yield item

"
        );
    }

    #[test]
    fn test_emit_content_detail_ignores_canonical_locators() {
        let stage = Stage {
            name: "article".to_string(),
            fields: vec![field("title", Locator::css("h1.headline"))],
            ..Default::default()
        };

        let body = emit(&stage, &config(true)).unwrap();
        assert_eq!(body.matches("item['title'] =").count(), 1);
        assert!(body.contains("item['title'] = article.title"));
        assert!(!body.contains("h1.headline"));
    }

    #[test]
    fn test_emit_list() {
        assert_eq!(
            emit(&list_stage(), &config(false)).unwrap(),
            "    def parse_list(self, response):
        prev_item = response.meta.get('item')
        for elem in response.css('tr.row'):
            item = Item()
            item['url'] = elem.css('a::attr(\"href\")').extract_first()
            if prev_item is not None:
                for key, value in prev_item.items():
                    if key not in item:
                        item[key] = value
            yield scrapy.Request(url=get_real_url(response, item['url']), callback=self.parse_detail, meta={'item': item})

"
        );
    }

    #[test]
    fn test_emit_list_with_pagination() {
        let stage = Stage {
            page_locator: Some(Locator::xpath("//a[@class='next']")),
            fields: vec![field("title", Locator::css("td.title"))],
            ..list_stage()
        };

        assert_eq!(
            emit(&stage, &config(false)).unwrap(),
            "    def parse_list(self, response):
        prev_item = response.meta.get('item')
        for elem in response.css('tr.row'):
            item = Item()
            item['title'] = elem.css('td.title::text').extract_first()
            if prev_item is not None:
                for key, value in prev_item.items():
                    if key not in item:
                        item[key] = value
            yield item
        next_url = response.xpath('//a[@class=\\'next\\']/@href').extract_first()
        if next_url is not None:
            yield scrapy.Request(url=get_real_url(response, next_url), callback=self.parse_list, meta={'item': prev_item})

"
        );
    }

    #[test]
    fn test_emit_unique_list() {
        let mut stage = list_stage();
        stage.fields.push(field("summary", Locator::css("td.summary")));

        assert_eq!(
            emit(&stage, &config(true)).unwrap(),
            "    def parse_list(self, response):
        prev_item = response.meta.get('item')
        for elem in response.css('tr.row'):
            url = elem.css('a::attr(\"href\")').extract_first()
            if unique_url(url):
                continue
            item = Item()
            item['url'] = elem.css('a::attr(\"href\")').extract_first()
            item['summary'] = elem.css('td.summary::text').extract_first()
            if prev_item is not None:
                for key, value in prev_item.items():
                    if key not in item:
                        item[key] = value
            yield scrapy.Request(url=get_real_url(response, item['url']), callback=self.parse_detail, meta={'item': item})

"
        );
    }

    #[test]
    fn test_emit_unique_list_process_scope() {
        let config = Config {
            content_extraction_mode: true,
            dedup_scope: DedupScope::Process,
            ..Default::default()
        };
        let body = emit(&list_stage(), &config).unwrap();

        assert!(body.contains("            if seen_url(url):\n                continue\n"));
        assert!(!body.contains("unique_url"));
    }

    #[test]
    fn test_emit_unique_list_without_url_field() {
        let stage = Stage {
            fields: vec![field("title", Locator::css("td"))],
            ..list_stage()
        };
        let body = emit(&stage, &config(true)).unwrap();

        assert!(!body.contains("continue"));
        assert!(body.contains("            item = Item()\n"));
    }

    #[test]
    fn test_emit_unique_list_guards_first_url_field_once() {
        let mut stage = list_stage();
        stage
            .fields
            .push(field("url", Locator::xpath("./td[2]/a").with_attr("href")));
        let body = emit(&stage, &config(true)).unwrap();

        assert_eq!(body.matches("if unique_url(url):").count(), 1);
        assert!(body.contains(
            "            url = elem.css('a::attr(\"href\")').extract_first()\n            if unique_url(url):\n"
        ));
        assert!(!body.contains("            url = elem.xpath("));
    }

    #[rstest]
    #[case::detail(false, false)]
    #[case::content_detail(false, true)]
    #[case::list(true, false)]
    #[case::unique_list(true, true)]
    fn test_emit_ambiguous_chain(#[case] is_list: bool, #[case] content_extraction_mode: bool) {
        let stage = Stage {
            name: "list".to_string(),
            is_list,
            list_locator: Some(Locator::css("tr")),
            fields: vec![
                chained("a", Locator::css("a"), "one"),
                field("b", Locator::css("b")),
                chained("c", Locator::css("c"), "two"),
            ],
            ..Default::default()
        };

        match emit(&stage, &config(content_extraction_mode)) {
            Err(Error::AmbiguousChain { stage, fields }) => {
                assert_eq!(stage, "list");
                assert_eq!(fields, vec!["a".to_string(), "c".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[rstest]
    #[case::list(false)]
    #[case::unique_list(true)]
    fn test_emit_missing_list_locator(#[case] content_extraction_mode: bool) {
        let stage = Stage {
            list_locator: None,
            ..list_stage()
        };
        assert!(matches!(
            emit(&stage, &config(content_extraction_mode)),
            Err(Error::MissingListLocator { .. })
        ));
    }

    #[test]
    fn test_emit_invalid_field_locator() {
        let mut stage = detail_stage();
        stage.fields.push(field("broken", Locator::default()));

        assert!(matches!(
            emit(&stage, &config(false)),
            Err(Error::InvalidLocator { .. })
        ));
    }

    #[test]
    fn test_chain_field_ignores_empty_next_stage() {
        let stage = Stage {
            fields: vec![Field {
                next_stage: Some(String::new()),
                ..field("url", Locator::css("a"))
            }],
            ..Default::default()
        };
        assert!(chain_field(&stage).unwrap().is_none());
    }

    #[test]
    fn test_carry_forward_follows_assignments() {
        let body = emit(&list_stage(), &config(false)).unwrap();
        let assignment = body.find("item['url'] =").unwrap();
        let carry = body.find("if prev_item is not None:").unwrap();
        let terminal = body.find("yield scrapy.Request").unwrap();

        assert!(assignment < carry);
        assert!(carry < terminal);
        assert!(body.contains("if key not in item:"));
    }
}
