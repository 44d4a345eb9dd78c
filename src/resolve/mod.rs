// src/resolve/mod.rs

use anyhow::Result;
use csv::StringRecord;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::error::{require_input, StageResult};
use crate::process::join::JOIN_KEY;
use crate::process::CsvTable;

pub mod ais;
pub mod limiter;

pub use ais::{opa_account_from_response, AddressLookup, AisClient, LookupResponse};
pub use limiter::{lookup_limiter, LookupLimiter};

const STAGE: &str = "resolve";
const ADDRESS_COLUMN: &str = "address";
const PROGRESS_EVERY: usize = 500;

/// Per-run tallies for the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub lookups: usize,
    pub cache_hits: usize,
    pub empty_addresses: usize,
    /// Lookups that came back without an account number.
    pub unresolved: usize,
}

/// Address → OPA account number resolver with a per-run memo.
///
/// Each distinct address reaches `lookup` at most once per resolver,
/// whatever the outcome, and every call first passes the rate limiter.
pub struct OpaResolver<L> {
    lookup: L,
    limiter: LookupLimiter,
    cache: HashMap<String, String>,
    stats: ResolveStats,
}

impl<L: AddressLookup> OpaResolver<L> {
    pub fn new(lookup: L, limiter: LookupLimiter) -> Self {
        Self {
            lookup,
            limiter,
            cache: HashMap::new(),
            stats: ResolveStats::default(),
        }
    }

    pub async fn resolve(&mut self, address: &str) -> Result<String> {
        if address.trim().is_empty() {
            self.stats.empty_addresses += 1;
            return Ok(String::new());
        }
        if let Some(hit) = self.cache.get(address) {
            self.stats.cache_hits += 1;
            return Ok(hit.clone());
        }

        self.limiter.until_ready().await;
        let resp = self.lookup.lookup(address).await?;
        let account = opa_account_from_response(&resp);
        self.stats.lookups += 1;
        if account.is_empty() {
            self.stats.unresolved += 1;
            debug!(address, status = resp.status, "no account number");
        }
        self.cache.insert(address.to_string(), account.clone());
        Ok(account)
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    /// Distinct non-empty addresses seen so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Fill `opa_account_num` for every row of `table` from its `address`.
/// An existing `opa_account_num` column is overwritten in place.
pub async fn resolve_table<L: AddressLookup>(
    table: &mut CsvTable,
    resolver: &mut OpaResolver<L>,
) -> Result<()> {
    let address_idx = table.column(ADDRESS_COLUMN)?;
    let existing = table.position(JOIN_KEY);
    if existing.is_none() {
        table.headers.push_field(JOIN_KEY);
    }

    let total = table.len();
    for (i, row) in table.rows.iter_mut().enumerate() {
        let address = row.get(address_idx).unwrap_or("").to_string();
        let account = resolver.resolve(&address).await?;
        match existing {
            Some(idx) => {
                let replaced: StringRecord = row
                    .iter()
                    .enumerate()
                    .map(|(j, field)| if j == idx { account.as_str() } else { field })
                    .collect();
                *row = replaced;
            }
            None => row.push_field(&account),
        }
        if (i + 1) % PROGRESS_EVERY == 0 {
            info!(done = i + 1, total, "resolving addresses");
        }
    }
    Ok(())
}

/// Read `input`, resolve every address, and write the enriched rows to `dest`.
#[instrument(level = "info", skip_all, fields(input = %input.display(), dest = %dest.display()))]
pub async fn resolve_file<L: AddressLookup>(
    input: &Path,
    dest: &Path,
    resolver: &mut OpaResolver<L>,
) -> StageResult<PathBuf> {
    require_input(STAGE, input)?;
    let mut table = CsvTable::read(input)?;
    resolve_table(&mut table, resolver).await?;
    table.write(dest)?;

    let stats = resolver.stats();
    info!(
        rows = table.len(),
        distinct = resolver.cached(),
        lookups = stats.lookups,
        cache_hits = stats.cache_hits,
        empty = stats.empty_addresses,
        unresolved = stats.unresolved,
        "wrote resolved requests"
    );
    Ok(dest.to_path_buf())
}
