//! Snapshot persistence for the contract, its ledger and its entropy chain
//!
//! The whole world is one JSON document, written to a temp file in the same
//! directory and renamed over the previous snapshot.

use crate::contract::ContractState;
use crate::errors::{BingoResult, StorageError};
use crate::games::entropy::HashChainEntropy;
use crate::ledger::MemoryLedger;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything needed to resume a CLI-driven deployment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub contract: ContractState,
    pub ledger: MemoryLedger,
    pub entropy: HashChainEntropy,
}

#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot, `None` if nothing has been saved yet
    pub fn load(&self) -> BingoResult<Option<Snapshot>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                ))
                .into())
            }
        };

        let snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::CorruptedData(format!(
                "Failed to decode snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), "Snapshot loaded");
        Ok(Some(snapshot))
    }

    pub fn save(&self, snapshot: &Snapshot) -> BingoResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StorageError::WriteFailed(format!("Failed to encode snapshot: {}", e)))?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, bytes).map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to move snapshot into {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            games = snapshot.contract.games.len(),
            "Snapshot saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Address, CallContext};
    use crate::contract::Bingo;
    use crate::errors::BingoError;
    use crate::games::params::GlobalConfig;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupted_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = StateStore::new(&path).load().unwrap_err();
        assert!(matches!(err, BingoError::Storage(StorageError::CorruptedData(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let owner = Address::derive("owner");

        let mut bingo = Bingo::deploy(
            CallContext::new(owner, 100),
            Address::derive("bingo"),
            GlobalConfig::default(),
            MemoryLedger::new(),
            HashChainEntropy::new([2; 32]),
        );
        bingo.generate_random(CallContext::new(owner, 101), 1).unwrap();

        let (contract, ledger, entropy) = bingo.into_parts();
        let snapshot = Snapshot {
            contract,
            ledger,
            entropy,
        };
        store.save(&snapshot).unwrap();

        assert_eq!(store.load().unwrap(), Some(snapshot));
        assert!(!dir.path().join("state.tmp").exists());
    }
}
