//! Key-value persistence for job postings and applications.
//!
//! Each collection lives under one Redis string key as a JSON array. Loading is lenient:
//! `null` and missing fields take their defaults, records that still fail to decode are
//! skipped, and an unparseable blob reads as an empty collection.
//!
//! Writes never lose what loading skipped. Undecodable records are carried over verbatim
//! on the next save, and a corrupt blob is copied to `<key>:corrupt` before it is
//! replaced. Every save goes out as one MULTI/EXEC transaction.

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Pipeline};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::job::JobPosting;

const JOBS_KEY: &str = "recruit:jobs";
const APPLICATIONS_KEY: &str = "recruit:applications";
const CORRUPT_SUFFIX: &str = ":corrupt";

/// A stored collection element with a stable identity.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
}

impl Record for JobPosting {
    const KIND: &'static str = "job";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Record for Application {
    const KIND: &'static str = "application";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

/// Result of decoding one stored collection.
#[derive(Debug)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    /// Raw elements that did not fit `T`, kept so a save can write them back.
    pub undecodable: Vec<Value>,
    /// The blob was not a JSON array at all.
    pub corrupt: bool,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            undecodable: Vec::new(),
            corrupt: false,
        }
    }
}

#[derive(Clone)]
pub struct Store {
    client: redis::Client,
}

impl Store {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    pub async fn load_jobs(&self) -> Result<Vec<JobPosting>, AppError> {
        self.load(JOBS_KEY).await
    }

    pub async fn load_applications(&self) -> Result<Vec<Application>, AppError> {
        self.load(APPLICATIONS_KEY).await
    }

    pub async fn save_jobs(&self, jobs: &[JobPosting]) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let writes = prepare_write(&mut conn, JOBS_KEY, jobs).await?;
        commit(&mut conn, &writes).await
    }

    pub async fn save_applications(&self, applications: &[Application]) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let writes = prepare_write(&mut conn, APPLICATIONS_KEY, applications).await?;
        commit(&mut conn, &writes).await
    }

    /// Writes both collections in one transaction: either both keys change or neither does.
    pub async fn save_all(
        &self,
        jobs: &[JobPosting],
        applications: &[Application],
    ) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let mut writes = prepare_write(&mut conn, JOBS_KEY, jobs).await?;
        writes.extend(prepare_write(&mut conn, APPLICATIONS_KEY, applications).await?);
        commit(&mut conn, &writes).await
    }

    async fn connection(&self) -> Result<MultiplexedConnection, AppError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    async fn load<T: Record>(&self, key: &str) -> Result<Vec<T>, AppError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        let items = raw
            .map(|r| decode_collection::<T>(&r).items)
            .unwrap_or_default();
        debug!("Loaded {} {} record(s) from {key}", items.len(), T::KIND);
        Ok(items)
    }
}

/// Key/body pairs for one collection, including whatever must survive the overwrite.
async fn prepare_write<T: Record>(
    conn: &mut MultiplexedConnection,
    key: &str,
    items: &[T],
) -> Result<Vec<(String, String)>, AppError> {
    let raw: Option<String> = conn.get(key).await?;
    let mut writes = Vec::new();

    let preserved = match raw {
        Some(raw) => {
            let decoded = decode_collection::<T>(&raw);
            if decoded.corrupt {
                warn!("Backing up corrupt {} collection to {key}{CORRUPT_SUFFIX}", T::KIND);
                writes.push((format!("{key}{CORRUPT_SUFFIX}"), raw));
            }
            decoded.undecodable
        }
        None => Vec::new(),
    };
    if !preserved.is_empty() {
        info!(
            "Carrying over {} undecodable {} record(s) in {key}",
            preserved.len(),
            T::KIND
        );
    }

    writes.push((key.to_string(), encode_collection(items, &preserved)?));
    Ok(writes)
}

async fn commit(
    conn: &mut MultiplexedConnection,
    writes: &[(String, String)],
) -> Result<(), AppError> {
    let pipe = write_pipeline(writes);
    let () = pipe.query_async(conn).await?;
    for (key, _) in writes {
        info!("Persisted {key}");
    }
    Ok(())
}

/// One atomic pipeline of `SET`s.
fn write_pipeline(writes: &[(String, String)]) -> Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();
    for (key, body) in writes {
        pipe.set(key.as_str(), body.as_str()).ignore();
    }
    pipe
}

/// Decodes a JSON array record by record.
///
/// Elements that do not fit `T` land in `undecodable`. A record stored without an id
/// gets one derived from its position and content, so it stays addressable and stable
/// across loads until the next save persists it.
pub fn decode_collection<T: Record>(raw: &str) -> Decoded<T> {
    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            warn!("Stored {} collection is not a JSON array; treating as empty", T::KIND);
            return Decoded {
                corrupt: true,
                ..Default::default()
            };
        }
        Err(e) => {
            warn!("Stored {} collection is corrupt ({e}); treating as empty", T::KIND);
            return Decoded {
                corrupt: true,
                ..Default::default()
            };
        }
    };

    let mut decoded = Decoded::default();
    for (idx, value) in values.into_iter().enumerate() {
        match T::deserialize(&value) {
            Ok(mut item) => {
                if item.id().is_nil() {
                    let seed = format!("{}:{idx}:{value}", T::KIND);
                    item.set_id(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()));
                    debug!("Assigned id {} to {} record at index {idx}", item.id(), T::KIND);
                }
                decoded.items.push(item);
            }
            Err(e) => {
                warn!("Skipping undecodable {} record at index {idx}: {e}", T::KIND);
                decoded.undecodable.push(value);
            }
        }
    }
    decoded
}

/// Serializes `items` followed by the preserved raw elements.
pub fn encode_collection<T: Serialize>(
    items: &[T],
    preserved: &[Value],
) -> Result<String, serde_json::Error> {
    let mut values = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    values.extend(preserved.iter().cloned());
    serde_json::to_string(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use serde_json::json;

    #[test]
    fn test_decode_fills_missing_fields_with_defaults() {
        let raw = json!([{ "full_name": "Ada", "position": "Backend" }]).to_string();
        let apps = decode_collection::<Application>(&raw).items;
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].full_name, "Ada");
        assert_eq!(apps[0].status, ApplicationStatus::Pending);
        assert!(apps[0].matched_required.is_empty());
        assert!(apps[0].potential_job_ids.is_empty());
        assert_eq!(apps[0].score_percent, None);
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let raw = json!([{
            "title": "Keep me",
            "description": null,
            "required_keywords": null,
            "pinned": null
        }])
        .to_string();
        let decoded = decode_collection::<JobPosting>(&raw);
        assert_eq!(decoded.items.len(), 1);
        assert!(decoded.undecodable.is_empty());
        assert_eq!(decoded.items[0].title, "Keep me");
        assert_eq!(decoded.items[0].description, "");
        assert!(decoded.items[0].required_keywords.is_empty());
        assert!(!decoded.items[0].pinned);
    }

    #[test]
    fn test_null_field_record_survives_decode_encode() {
        let raw = json!([
            { "title": "Keep me", "description": null },
            { "title": "Other" }
        ])
        .to_string();
        let decoded = decode_collection::<JobPosting>(&raw);
        let body = encode_collection(&decoded.items, &decoded.undecodable).unwrap();

        let again = decode_collection::<JobPosting>(&body);
        let titles: Vec<_> = again.items.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Keep me", "Other"]);
    }

    #[test]
    fn test_undecodable_records_are_written_back() {
        let raw = json!([
            { "title": "Good job", "required_keywords": ["SQL"] },
            { "title": 42 },
            "not an object",
            { "title": "Also good" }
        ])
        .to_string();
        let decoded = decode_collection::<JobPosting>(&raw);
        assert_eq!(decoded.items.len(), 2);
        assert_eq!(decoded.items[0].title, "Good job");
        assert_eq!(decoded.items[1].title, "Also good");
        assert_eq!(decoded.undecodable.len(), 2);

        let mut jobs = decoded.items;
        jobs[0].pinned = true;
        let body = encode_collection(&jobs, &decoded.undecodable).unwrap();
        let stored: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(stored.len(), 4);
        assert!(stored.contains(&json!({ "title": 42 })));
        assert!(stored.contains(&json!("not an object")));
    }

    #[test]
    fn test_decode_corrupt_blob_is_empty() {
        let decoded = decode_collection::<JobPosting>("{not json");
        assert!(decoded.items.is_empty());
        assert!(decoded.corrupt);
        let decoded = decode_collection::<JobPosting>(r#"{"title": "x"}"#);
        assert!(decoded.items.is_empty());
        assert!(decoded.corrupt);
    }

    #[test]
    fn test_missing_ids_are_stable_and_distinct() {
        let raw = json!([{ "full_name": "Ada" }, { "full_name": "Ada" }]).to_string();
        let first = decode_collection::<Application>(&raw).items;
        let second = decode_collection::<Application>(&raw).items;

        assert!(!first[0].id.is_nil());
        assert_ne!(first[0].id, first[1].id);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[1].id, second[1].id);
    }

    #[test]
    fn test_stored_ids_are_kept() {
        let id = Uuid::new_v4();
        let raw = json!([{ "id": id, "title": "T" }]).to_string();
        let jobs = decode_collection::<JobPosting>(&raw).items;
        assert_eq!(jobs[0].id, id);
    }

    #[test]
    fn test_write_pipeline_is_one_transaction() {
        let writes = vec![
            (JOBS_KEY.to_string(), "[]".to_string()),
            (APPLICATIONS_KEY.to_string(), "[]".to_string()),
        ];
        let packed = write_pipeline(&writes).get_packed_pipeline();
        let packed = String::from_utf8_lossy(&packed);

        let multi = packed.find("MULTI").unwrap();
        let jobs = packed.find(JOBS_KEY).unwrap();
        let apps = packed.find(APPLICATIONS_KEY).unwrap();
        let exec = packed.find("EXEC").unwrap();
        assert!(multi < jobs && jobs < apps && apps < exec);
    }

    #[test]
    fn test_records_round_trip_through_storage_format() {
        let app = Application {
            id: Uuid::new_v4(),
            full_name: "Grace".to_string(),
            score_percent: Some(80),
            matched_keywords: vec!["sql".to_string()],
            ..Default::default()
        };
        let body = encode_collection(&[app.clone()], &[]).unwrap();
        let decoded = decode_collection::<Application>(&body).items;
        assert_eq!(decoded, vec![app]);
    }
}
