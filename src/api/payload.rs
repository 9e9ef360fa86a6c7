use rand::Rng;
use serde::Serialize;
use serde_json::Value;

/// Name prefix shared by every resource a perf run creates; the leftover
/// sweep uses it to attribute service accounts to the run.
pub const RESOURCE_NAME_PREFIX: &str = "perf-test";

const SUFFIX_LEN: usize = 8;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Creation payload for a kafka request.
pub fn kafka_request(rng: &mut impl Rng) -> Value {
    serde_json::json!({
        "name": format!("{RESOURCE_NAME_PREFIX}-kafka-{}", random_suffix(rng)),
        "cloud_provider": "aws",
        "region": "us-east-1",
        "multi_az": true,
    })
}

/// Creation payload for a service account.
///
/// The client ID and secret are generated on this side; they double as the
/// credentials persisted to the config sink once the owning kafka is ready.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceAccountRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

pub fn service_account_request(rng: &mut impl Rng) -> ServiceAccountRequest {
    let suffix = random_suffix(rng);
    ServiceAccountRequest {
        name: format!("{RESOURCE_NAME_PREFIX}-svc-acc-{suffix}"),
        description: "service account created by a fleetbench run".to_owned(),
        client_id: format!("srvc-acct-{suffix}"),
        client_secret: random_secret(rng),
    }
}

pub fn random_secret(rng: &mut impl Rng) -> String {
    random_chars(rng, 16)
}

/// Search expression for `GET /kafkas?search=…`, already percent-encoded
/// for direct use as a query value.
pub fn random_search_term(rng: &mut impl Rng) -> String {
    let field = ["name", "owner", "cloud_provider", "region"]
        [rng.random_range(0..4)];
    format!(
        "{field}%20%3D%20{RESOURCE_NAME_PREFIX}-kafka-{}",
        random_suffix(rng)
    )
}

/// IDs of a collection response, treated as `{ "items": [ { "id": … }, … ] }`.
pub fn item_ids(body: &Value) -> Vec<String> {
    items(body)
        .iter()
        .filter_map(|item| item.get("id").and_then(Value::as_str).map(str::to_owned))
        .collect()
}

/// IDs of the collection entries this perf run created, judged by the
/// shared name prefix.
pub fn perf_run_item_ids(body: &Value) -> Vec<String> {
    items(body)
        .iter()
        .filter(|item| {
            item.get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name.starts_with(RESOURCE_NAME_PREFIX))
        })
        .filter_map(|item| item.get("id").and_then(Value::as_str).map(str::to_owned))
        .collect()
}

fn items(body: &Value) -> &[Value] {
    body.get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn random_suffix(rng: &mut impl Rng) -> String {
    random_chars(rng, SUFFIX_LEN)
}

fn random_chars(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng as _, rngs::SmallRng};

    #[test]
    fn item_ids_reads_the_items_collection() {
        let body = serde_json::json!({
            "items": [
                { "id": "a", "name": "first" },
                { "name": "no id here" },
                { "id": "b" },
            ],
            "total": 3,
        });
        assert_eq!(item_ids(&body), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn item_ids_is_empty_without_items() {
        assert!(item_ids(&serde_json::json!({})).is_empty());
        assert!(item_ids(&serde_json::json!({ "items": "nope" })).is_empty());
    }

    #[test]
    fn perf_run_item_ids_filters_on_the_name_prefix() {
        let body = serde_json::json!({
            "items": [
                { "id": "ours", "name": format!("{RESOURCE_NAME_PREFIX}-svc-acc-abc") },
                { "id": "theirs", "name": "someone-elses-account" },
                { "id": "nameless" },
            ],
        });
        assert_eq!(perf_run_item_ids(&body), vec!["ours".to_owned()]);
    }

    #[test]
    fn service_account_payload_uses_the_wire_field_names() {
        let mut rng = SmallRng::seed_from_u64(7);
        let payload = service_account_request(&mut rng);
        let value = serde_json::to_value(&payload).expect("serialize");
        assert!(value.get("clientID").is_some());
        assert!(value.get("clientSecret").is_some());
        assert!(
            value["name"]
                .as_str()
                .expect("name")
                .starts_with(RESOURCE_NAME_PREFIX)
        );
    }

    #[test]
    fn search_terms_are_query_safe() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..64 {
            let term = random_search_term(&mut rng);
            assert!(!term.contains(' '), "term must be usable raw: {term}");
            assert!(!term.is_empty());
        }
    }
}
