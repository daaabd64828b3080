// src/formatting/json.rs
//! Structural JSON output of a page.

use super::PageFormatter;
use crate::error::AppError;
use crate::model::{PageContent, PropertyMap, SlimBlock};
use serde::Serialize;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonPage<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "no_properties")]
    properties: &'a PropertyMap,
    blocks: &'a [SlimBlock],
}

fn no_properties(properties: &&PropertyMap) -> bool {
    properties.is_empty()
}

impl PageFormatter for JsonFormatter {
    fn format_page(&self, content: &PageContent) -> Result<String, AppError> {
        let page = JsonPage {
            id: &content.page.id,
            title: &content.page.title,
            properties: &content.page.properties,
            blocks: &content.blocks,
        };
        Ok(serde_json::to_string_pretty(&page)?)
    }
}
