//! Field normalization and deduplication of raw collection entries.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::consts::{
    NO_DESCRIPTION, NO_ETHEREUM_CONTRACT, NO_IMAGE, NO_TWITTER, NOT_AVAILABLE, SECURE_URL_PREFIX, TARGET_CHAIN,
    UNNAMED_COLLECTION,
};
use crate::models::Collection;

/// Converts a raw `{"collections": [...]}` payload into normalized records.
///
/// Entries without an Ethereum contract are dropped, as are later entries
/// whose (normalized) slug has already been seen. Output order is the order
/// in which slugs were first seen.
#[instrument(skip(raw))]
pub fn transform(raw: &Value) -> Vec<Collection> {
    let Some(entries) = raw.get("collections").and_then(Value::as_array) else {
        tracing::warn!("No collections found in API response");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut transformed = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(entry) = entry.as_object() else {
            tracing::debug!("Skipping non-object collection entry");
            continue;
        };
        let record = normalize(entry);
        if record.contracts == NO_ETHEREUM_CONTRACT {
            tracing::debug!(collection = %record.collection, "Skipping collection without an Ethereum contract");
            continue;
        }
        if !seen.insert(record.collection.clone()) {
            tracing::debug!(collection = %record.collection, "Skipping duplicate collection");
            continue;
        }
        transformed.push(record);
    }

    let transformed = dedup_by_collection(transformed);
    tracing::info!(received = entries.len(), kept = transformed.len(), "Transformed collections");
    transformed
}

/// Normalizes every field of a single entry. Does not filter.
pub(crate) fn normalize(entry: &Map<String, Value>) -> Collection {
    let mut slug = text(entry, "slug").trim().to_lowercase();
    let mut name = text(entry, "name").trim().to_string();
    let mut description = text(entry, "description").trim().to_string();

    if slug.is_empty() || slug == NOT_AVAILABLE {
        slug = match name.is_empty() {
            true => UNNAMED_COLLECTION.to_string(),
            false => name.to_lowercase().replace(' ', "-"),
        };
    }
    if name.is_empty() || name.eq_ignore_ascii_case(NOT_AVAILABLE) {
        name = title_case(&slug.replace('-', " "));
    }
    if description.is_empty() || description.eq_ignore_ascii_case(NOT_AVAILABLE) {
        description = NO_DESCRIPTION.to_string();
    }

    let mut image_url = text(entry, "image_url").trim().to_string();
    if !image_url.starts_with(SECURE_URL_PREFIX) {
        image_url = NO_IMAGE.to_string();
    }
    let owner = text(entry, "owner").trim().to_lowercase();
    let mut twitter_username = text(entry, "twitter_username").trim().to_lowercase();
    if twitter_username.is_empty() {
        twitter_username = NO_TWITTER.to_string();
    }

    Collection {
        collection: slug,
        name,
        description,
        image_url,
        owner,
        twitter_username,
        contracts: first_ethereum_contract(entry).unwrap_or_else(|| NO_ETHEREUM_CONTRACT.to_string()),
    }
}

/// Missing keys, `null` and non-string values all read as empty.
fn text<'a>(entry: &'a Map<String, Value>, key: &str) -> &'a str {
    entry.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Lower-cased address of the first contract deployed on the target chain.
fn first_ethereum_contract(entry: &Map<String, Value>) -> Option<String> {
    entry
        .get("contracts")
        .and_then(Value::as_array)?
        .iter()
        .filter(|contract| contract.get("chain").and_then(Value::as_str) == Some(TARGET_CHAIN))
        .find_map(|contract| contract.get("address").and_then(Value::as_str))
        .map(str::to_lowercase)
}

/// Second, idempotent pass: keep the first record for each `collection`.
pub fn dedup_by_collection(records: Vec<Collection>) -> Vec<Collection> {
    let mut seen = HashSet::new();
    records.into_iter().filter(|record| seen.insert(record.collection.clone())).collect()
}

/// Upper-cases cased letters that follow an uncased character, lower-cases
/// those that follow a cased letter (`"a1b c"` becomes `"A1B C"`). Letters
/// without case, such as CJK ideographs, count as separators.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_cased = false;
    for c in s.chars() {
        if c.is_lowercase() || c.is_uppercase() {
            match previous_cased {
                true => out.extend(c.to_lowercase()),
                false => out.extend(c.to_uppercase()),
            }
            previous_cased = true;
        } else {
            out.push(c);
            previous_cased = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn eth(address: &str) -> Value {
        json!([{ "address": address, "chain": "ethereum" }])
    }

    fn entry(slug: &str, name: &str) -> Value {
        json!({
            "slug": slug,
            "name": name,
            "description": "A description",
            "image_url": "https://example.com/image.png",
            "owner": "0xOwner",
            "twitter_username": "Handle",
            "contracts": eth("0xABC"),
        })
    }

    fn single(value: Value) -> Collection {
        normalize(value.as_object().unwrap())
    }

    #[rstest]
    #[case("", "Cool Cats", "cool-cats")]
    #[case("", "", "unnamed-collection")]
    #[case("n/a", "Bored Apes", "bored-apes")]
    #[case("N/A", "", "unnamed-collection")]
    #[case("  Doodles-Official ", "Doodles", "doodles-official")]
    fn test_slug_derivation(#[case] slug: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(single(entry(slug, name)).collection, expected);
    }

    #[rstest]
    #[case("cool-cats", "", "Cool Cats")]
    #[case("cool-cats", "N/A", "Cool Cats")]
    #[case("cool-cats", "  Cool Cats NFT  ", "Cool Cats NFT")]
    #[case("", "", "Unnamed Collection")]
    fn test_name_derivation(#[case] slug: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(single(entry(slug, name)).name, expected);
    }

    #[rstest]
    #[case("cool cats", "Cool Cats")]
    #[case("CRYPTO punks", "Crypto Punks")]
    #[case("v2 a1b", "V2 A1B")]
    #[case("", "")]
    #[case("東京cats", "東京Cats")]
    #[case("éclair ÉTÉ", "Éclair Été")]
    fn test_title_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }

    #[rstest]
    #[case(json!(""))]
    #[case(json!("n/a"))]
    #[case(json!("N/A"))]
    #[case(json!(null))]
    fn test_description_sentinel(#[case] description: Value) {
        let mut value = entry("slug", "Name");
        value["description"] = description;
        assert_eq!(single(value).description, NO_DESCRIPTION);
    }

    #[rstest]
    #[case(json!(""), NO_IMAGE)]
    #[case(json!("http://example.com/a.png"), NO_IMAGE)]
    #[case(json!("ipfs://Qm"), NO_IMAGE)]
    #[case(json!(null), NO_IMAGE)]
    #[case(json!("  https://example.com/a.png "), "https://example.com/a.png")]
    fn test_image_url(#[case] image_url: Value, #[case] expected: &str) {
        let mut value = entry("slug", "Name");
        value["image_url"] = image_url;
        assert_eq!(single(value).image_url, expected);
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        let record = single(json!({ "slug": "bare", "contracts": eth("0x1") }));
        assert_eq!(record.name, "Bare");
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.image_url, NO_IMAGE);
        assert_eq!(record.twitter_username, NO_TWITTER);
        assert_eq!(record.owner, "");
    }

    #[rstest]
    #[case(json!(""))]
    #[case(json!("   "))]
    #[case(json!(null))]
    fn test_blank_twitter_uses_sentinel(#[case] twitter_username: Value) {
        let mut value = entry("slug", "Name");
        value["twitter_username"] = twitter_username;
        assert_eq!(single(value).twitter_username, NO_TWITTER);
    }

    #[test]
    fn test_owner_and_twitter_are_lowercased() {
        let record = single(entry("slug", "Name"));
        assert_eq!(record.owner, "0xowner");
        assert_eq!(record.twitter_username, "handle");
    }

    #[test]
    fn test_first_ethereum_contract_wins() {
        let mut value = entry("slug", "Name");
        value["contracts"] = json!([
            { "address": "0xPOLY", "chain": "matic" },
            { "address": "0xFIRST", "chain": "ethereum" },
            { "address": "0xSECOND", "chain": "ethereum" },
        ]);
        assert_eq!(single(value).contracts, "0xfirst");
    }

    #[rstest]
    #[case(json!([]))]
    #[case(json!([{ "address": "0xPOLY", "chain": "matic" }]))]
    #[case(json!([{ "chain": "ethereum" }]))]
    #[case(json!(null))]
    fn test_no_ethereum_contract_is_dropped(#[case] contracts: Value) {
        let mut value = entry("slug", "Name");
        value["contracts"] = contracts;
        assert_eq!(single(value.clone()).contracts, NO_ETHEREUM_CONTRACT);
        assert!(transform(&json!({ "collections": [value] })).is_empty());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut second = entry("cool-cats", "Second");
        second["contracts"] = eth("0xDEF");
        let raw = json!({ "collections": [entry("Cool-Cats", "First"), second, entry("other", "Other")] });
        let out = transform(&raw);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].collection, "cool-cats");
        assert_eq!(out[0].name, "First");
        assert_eq!(out[0].contracts, "0xabc");
        assert_eq!(out[1].collection, "other");
    }

    #[test]
    fn test_derived_slug_collides_with_explicit_slug() {
        let raw = json!({ "collections": [entry("cool-cats", "A"), entry("", "Cool Cats")] });
        let out = transform(&raw);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "A");
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!(null))]
    #[case(json!({ "collections": "nope" }))]
    #[case(json!({ "next": "cursor" }))]
    fn test_malformed_payload_is_empty(#[case] raw: Value) {
        assert!(transform(&raw).is_empty());
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let raw = json!({ "collections": [42, "string", entry("ok", "Ok")] });
        assert_eq!(transform(&raw).len(), 1);
    }

    #[test]
    fn test_dedup_pass_keeps_first_and_order() {
        let a = single(entry("a", "A1"));
        let b = single(entry("b", "B"));
        let a2 = single(entry("a", "A2"));
        let out = dedup_by_collection(vec![a.clone(), b.clone(), a2]);
        assert_eq!(out, vec![a.clone(), b.clone()]);
        assert_eq!(dedup_by_collection(out.clone()), out);
    }

    #[test]
    fn test_mixed_batch() {
        let mut no_contract = entry("no-contract", "No Contract");
        no_contract["contracts"] = json!([{ "address": "0x9", "chain": "base" }]);
        let raw = json!({
            "collections": [no_contract, entry("good", "Good"), entry("GOOD", "Duplicate")],
        });
        let out = transform(&raw);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0],
            Collection {
                collection: "good".to_string(),
                name: "Good".to_string(),
                description: "A description".to_string(),
                image_url: "https://example.com/image.png".to_string(),
                owner: "0xowner".to_string(),
                twitter_username: "handle".to_string(),
                contracts: "0xabc".to_string(),
            }
        );
    }
}
