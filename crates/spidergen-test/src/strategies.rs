//! Property-based testing strategies for spidergen configurations.
//!
//! The generated configurations are always structurally valid: every locator
//! has a selector, list stages have a list locator, each stage chains to at
//! most one existing stage.
//!
//! # Examples
//!
//! ```rust,ignore
//! use spidergen_test::strategies::*;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn test_something(config in arb_config()) {
//!         // Your test here
//!     }
//! }
//! ```

use proptest::prelude::*;
use spidergen::{Config, DedupScope, Field, Locator, Stage};

/// Field and stage names. Drawn from a small pool so collisions happen often.
pub fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "url", "title", "content", "tags", "author", "price", "ts", "_id", "body",
        ])
        .prop_map(str::to_string),
        "[a-z][a-z0-9_]{0,8}".prop_filter("field names must be valid", |name| {
            spidergen::fields::is_valid_name(name)
        }),
    ]
}

pub fn arb_locator() -> impl Strategy<Value = Locator> {
    let attr = prop::option::of(prop::sample::select(vec!["href", "src", "data-id"]));
    prop_oneof![
        ("[a-z]{1,5}(\\.[a-z]{1,5})?", attr.clone()).prop_map(|(css, attr)| Locator {
            css: Some(css),
            xpath: None,
            attr: attr.map(str::to_string),
        }),
        ("//[a-z]{1,5}(\\[@class='[a-z]{1,5}'\\])?", attr).prop_map(|(xpath, attr)| Locator {
            css: None,
            xpath: Some(xpath),
            attr: attr.map(str::to_string),
        }),
    ]
}

pub fn arb_field() -> impl Strategy<Value = Field> {
    (arb_name(), arb_locator()).prop_map(|(name, locator)| Field {
        name,
        locator,
        next_stage: None,
    })
}

/// Stage shape without its name or chain target, which depend on the other stages.
pub fn arb_stage_body() -> impl Strategy<Value = Stage> {
    (
        any::<bool>(),
        prop::collection::vec(arb_field(), 0..5),
        arb_locator(),
        prop::option::of(arb_locator()),
        prop::option::of(prop::sample::select(vec!["href", "data-next"])),
    )
        .prop_map(|(is_list, fields, list, page, page_attr)| Stage {
            name: String::new(),
            is_list,
            fields,
            list_locator: is_list.then_some(list),
            page_locator: page,
            page_attr: page_attr.map(str::to_string),
        })
}

/// A valid configuration with one to four stages named `stage0..`.
///
/// Each stage may chain one of its fields to any stage, itself included.
pub fn arb_config() -> impl Strategy<Value = Config> {
    (
        prop::collection::vec(
            (
                arb_stage_body(),
                any::<prop::sample::Index>(),
                any::<prop::sample::Index>(),
            ),
            1..5,
        ),
        any::<bool>(),
        prop::sample::select(vec!["", "http", "socks5"]),
        prop::sample::select(vec![DedupScope::Persisted, DedupScope::Process]),
    )
        .prop_map(|(stages, content_extraction_mode, proxy_mode, dedup_scope)| {
            let count = stages.len();
            let stages = stages
                .into_iter()
                .enumerate()
                .map(|(i, (mut stage, chain_field, chain_target))| {
                    stage.name = format!("stage{}", i);
                    // Index `count` stands for "no chain".
                    let target = chain_target.index(count + 1);
                    if !stage.fields.is_empty() && target < count {
                        let field = chain_field.index(stage.fields.len());
                        stage.fields[field].next_stage = Some(format!("stage{}", target));
                    }
                    stage
                })
                .collect();

            Config {
                content_extraction_mode,
                proxy_mode: proxy_mode.to_string(),
                entry_url: "https://example.com/".to_string(),
                dedup_scope,
                stages,
            }
        })
}
