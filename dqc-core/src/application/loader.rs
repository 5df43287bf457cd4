// dqc-core/src/application/loader.rs

use std::path::Path;
use tracing::{info, instrument};

use crate::domain::cache::ConfigsCache;
use crate::domain::config::ConfigKind;
use crate::domain::ports::{ConfigSource, ConfigStore};
use crate::error::DqcError;

/// Loads every kind from `configs_path` into a fresh cache, in dependency order.
/// The cache is read-only from here on.
#[instrument(skip(source, store, configs_path), fields(path = %configs_path.display()))]
pub fn prepare_configs_cache(
    source: &dyn ConfigSource,
    configs_path: &Path,
    store: Box<dyn ConfigStore>,
) -> Result<ConfigsCache, DqcError> {
    let mut cache = ConfigsCache::new(store);
    for kind in ConfigKind::LOAD_ORDER {
        let collection = source.load(configs_path, kind)?;
        cache.load_all(kind, &collection)?;
    }
    info!("Configs cache ready");
    Ok(cache)
}
