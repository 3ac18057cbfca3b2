use std::collections::{BTreeSet, HashMap};

use anyhow::Context as _;
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::config::FetchConfig;
use crate::extract::{extract_character, extract_platform_label, parse_sheet_attrs};
use crate::fetch::{Fetched, Fetcher, ResponseKind};
use crate::formats::{CampaignIndex, CampaignSnapshot, CharacterExtraction, CharacterRecord};
use crate::mapping::{MappingSource, MappingTable};
use crate::normalize::normalize;

/// A character between extraction and normalization.
#[derive(Debug, Clone)]
struct Pending {
    record: CharacterRecord,
    extraction: Option<CharacterExtraction>,
}

/// Mirrors one campaign: index, platform label, character pages, mapping
/// tables, standardized sheets. Stages run strictly in sequence and
/// characters are fetched one at a time in index order.
pub struct Pipeline<F, M> {
    config: FetchConfig,
    fetcher: F,
    mappings: M,
}

impl<F: Fetcher, M: MappingSource> Pipeline<F, M> {
    pub fn new(config: FetchConfig, fetcher: F, mappings: M) -> Self {
        Self {
            config,
            fetcher,
            mappings,
        }
    }

    pub fn run(&self) -> anyhow::Result<CampaignSnapshot> {
        tracing::info!(base_url = %self.config.base_url, "sync: fetch index");
        let index = self.fetch_index().context("fetch campaign index")?;

        tracing::info!("sync: extract platform");
        let platform = self.fetch_platform();

        tracing::info!(characters = index.game_characters.len(), "sync: fetch characters");
        let mut pending = self.fetch_characters(&index);

        tracing::info!("sync: resolve sheet types");
        let sheet_types = resolve_sheet_types(&mut pending);

        tracing::info!(sheet_types = sheet_types.len(), "sync: load mappings");
        let tables = load_mappings(&self.mappings, platform.as_deref(), &sheet_types)?;

        tracing::info!("sync: normalize characters");
        let characters = normalize_characters(pending, &tables)?;

        Ok(CampaignSnapshot {
            platform,
            characters,
        })
    }

    fn fetch_index(&self) -> anyhow::Result<CampaignIndex> {
        let url = self.config.index_url()?;
        let value = self
            .fetcher
            .fetch(&url, ResponseKind::Json)
            .and_then(Fetched::into_json)
            .ok_or_else(|| anyhow::anyhow!("campaign index unavailable: {url}"))?;
        serde_json::from_value(value).with_context(|| format!("parse campaign index: {url}"))
    }

    fn fetch_platform(&self) -> Option<String> {
        let html = self
            .fetcher
            .fetch(&self.config.base_url, ResponseKind::Html)
            .and_then(Fetched::into_text)?;
        let platform = extract_platform_label(&html);
        match platform.as_deref() {
            Some(label) => tracing::info!(platform = label, "campaign platform"),
            None => tracing::warn!("campaign page has no system logo; platform unknown"),
        }
        platform
    }

    fn fetch_characters(&self, index: &CampaignIndex) -> IndexMap<String, Pending> {
        let mut pending = IndexMap::with_capacity(index.game_characters.len());

        for stub in &index.game_characters {
            let extraction = match self.config.character_url(&stub.path) {
                Ok(url) => {
                    let extraction = self
                        .fetcher
                        .fetch(&url, ResponseKind::Html)
                        .and_then(Fetched::into_text)
                        .and_then(|html| extract_character(&html));
                    if extraction.is_none() {
                        tracing::debug!(title = %stub.title, %url, "no sheet markers");
                    }
                    extraction
                }
                Err(err) => {
                    tracing::warn!(
                        title = %stub.title,
                        path = %stub.path,
                        error = %format!("{err:#}"),
                        "unusable character path"
                    );
                    None
                }
            };

            let entry = Pending {
                record: CharacterRecord::new(stub.path.clone()),
                extraction,
            };
            match pending.entry(stub.title.clone()) {
                Entry::Occupied(mut slot) => {
                    tracing::warn!(title = %stub.title, "duplicate character title; keeping the later entry");
                    slot.insert(entry);
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }

        pending
    }
}

/// Copies each non-empty slug onto its record and returns the distinct set.
fn resolve_sheet_types(pending: &mut IndexMap<String, Pending>) -> BTreeSet<String> {
    let mut sheet_types = BTreeSet::new();
    for character in pending.values_mut() {
        let Some(slug) = character
            .extraction
            .as_ref()
            .and_then(|e| e.dst_slug.as_deref())
            .filter(|slug| !slug.is_empty())
        else {
            continue;
        };
        character.record.sheet_type = slug.to_owned();
        sheet_types.insert(slug.to_owned());
    }
    sheet_types
}

fn load_mappings<M: MappingSource>(
    mappings: &M,
    platform: Option<&str>,
    sheet_types: &BTreeSet<String>,
) -> anyhow::Result<HashMap<String, MappingTable>> {
    let mut tables = HashMap::with_capacity(sheet_types.len());
    for sheet_type in sheet_types {
        let table = mappings
            .load(platform, sheet_type)
            .with_context(|| format!("load mapping for sheet type {sheet_type:?}"))?;
        tracing::debug!(sheet_type = %sheet_type, keys = table.len(), "mapping loaded");
        tables.insert(sheet_type.clone(), table);
    }
    Ok(tables)
}

fn normalize_characters(
    pending: IndexMap<String, Pending>,
    tables: &HashMap<String, MappingTable>,
) -> anyhow::Result<IndexMap<String, CharacterRecord>> {
    let mut characters = IndexMap::with_capacity(pending.len());

    for (title, Pending { mut record, extraction }) in pending {
        if !record.sheet_type.is_empty() {
            let table = tables
                .get(&record.sheet_type)
                .ok_or_else(|| anyhow::anyhow!("no mapping loaded for {:?}", record.sheet_type))?;

            let payload = extraction.and_then(|e| e.dynamic_sheet_attrs);
            match payload.as_deref().map(parse_sheet_attrs) {
                Some(Ok(attrs)) => record.standardized_sheet = Some(normalize(&attrs, table)),
                Some(Err(err)) => {
                    tracing::warn!(title = %title, error = %format!("{err:#}"), "malformed sheet attributes");
                }
                None => tracing::warn!(title = %title, "sheet type without attribute payload"),
            }
        }
        characters.insert(title, record);
    }

    Ok(characters)
}
