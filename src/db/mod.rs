use anyhow::{Context, Result};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde_json;
use tracing::debug;

use crate::model::device::{Device, DeviceType};

use std::str;

pub struct DBLayer {
    db: DB,
}

impl DBLayer {
    pub fn new(path: &str) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).with_context(|| format!("Failed to open device db at {path}"))?;
        Ok(Self { db })
    }

    // ============================================================
    // KEYS
    // ============================================================
    fn device_key(id: &str) -> String {
        format!("device:{id}")
    }

    fn identifier_prefix(identifier: &str) -> String {
        format!("device_identifier:{identifier}:")
    }

    fn identifier_key(identifier: &str, id: &str) -> String {
        format!("{}{}", Self::identifier_prefix(identifier), id)
    }

    fn token_prefix(token: &str) -> String {
        format!("device_token:{token}:")
    }

    fn token_key(token: &str, id: &str) -> String {
        format!("{}{}", Self::token_prefix(token), id)
    }

    // ============================================================
    // DEVICE STORAGE
    // ============================================================
    pub async fn load_device(&self, id: &str) -> Result<Option<Device>> {
        let key = Self::device_key(id);
        self.db
            .get(key)?
            .map(|v| serde_json::from_slice::<Device>(&v))
            .transpose()
            .with_context(|| format!("Corrupt device record {id}"))
    }

    /// Insert or update a device and keep its lookup indexes in step.
    ///
    /// Record, new index entries and removal of stale ones commit as one batch.
    pub async fn save_device(&self, device: &Device) -> Result<()> {
        let previous = self.load_device(&device.id).await?;

        let mut batch = WriteBatch::default();
        batch.put(Self::identifier_key(&device.identifier, &device.id), device.id.as_bytes());
        batch.put(Self::token_key(&device.token, &device.id), device.id.as_bytes());
        batch.put(Self::device_key(&device.id), serde_json::to_vec(device)?);

        if let Some(old) = previous {
            if old.identifier != device.identifier {
                batch.delete(Self::identifier_key(&old.identifier, &old.id));
            }
            if old.token != device.token {
                batch.delete(Self::token_key(&old.token, &old.id));
            }
        }

        self.db
            .write(batch)
            .with_context(|| format!("Failed to save device {}", device.id))?;
        Ok(())
    }

    /// Remove a device record and its index entries. Returns false if the
    /// device was already gone.
    pub async fn delete_device(&self, id: &str) -> Result<bool> {
        let Some(existing) = self.load_device(id).await? else {
            return Ok(false);
        };

        let mut batch = WriteBatch::default();
        batch.delete(Self::device_key(id));
        batch.delete(Self::identifier_key(&existing.identifier, id));
        batch.delete(Self::token_key(&existing.token, id));

        self.db
            .write(batch)
            .with_context(|| format!("Failed to delete device {id}"))?;
        Ok(true)
    }

    // ============================================================
    // LOOKUPS
    // ============================================================
    pub async fn find_device_by_identifier(&self, identifier: &str) -> Result<Option<Device>> {
        self.find_in_index(&Self::identifier_prefix(identifier), |d| {
            d.identifier == identifier
        })
    }

    pub async fn find_device_by_token(&self, token: &str) -> Result<Option<Device>> {
        self.find_in_index(&Self::token_prefix(token), |d| d.token == token)
    }

    pub async fn find_device_by_identifier_and_type(
        &self,
        identifier: &str,
        device_type: DeviceType,
    ) -> Result<Option<Device>> {
        self.find_in_index(&Self::identifier_prefix(identifier), |d| {
            d.identifier == identifier && d.device_type == Some(device_type)
        })
    }

    pub async fn find_device_by_identifier_and_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<Device>> {
        self.find_in_index(&Self::identifier_prefix(identifier), |d| {
            d.identifier == identifier && d.token == token
        })
    }

    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let prefix = "device:";
        let mut results = Vec::new();

        for item in self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward))
        {
            let (key, val) = item?;
            let k = str::from_utf8(&key)?;

            if !k.starts_with(prefix) {
                break;
            }

            results.push(serde_json::from_slice(&val)?);
        }

        Ok(results)
    }

    /// Walk an index prefix and return the first live device accepted by
    /// `matches`. Entries without a record are skipped, never deleted here.
    fn find_in_index<F>(&self, prefix: &str, matches: F) -> Result<Option<Device>>
    where
        F: Fn(&Device) -> bool,
    {
        for item in self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward))
        {
            let (key, val) = item?;
            let k = str::from_utf8(&key)?;
            if !k.starts_with(prefix) {
                break;
            }

            let id = str::from_utf8(&val)?;
            let Some(raw) = self.db.get(Self::device_key(id))? else {
                debug!(key = k, "skipping device index entry without record");
                continue;
            };

            // A prefix like "device_identifier:a:" also covers identifier
            // "a:b", so the record itself decides.
            let device: Device = serde_json::from_slice(&raw)?;
            if matches(&device) {
                return Ok(Some(device));
            }
        }

        Ok(None)
    }
}
