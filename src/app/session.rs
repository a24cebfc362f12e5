//! Per-process table cache owned by the front-ends.
//!
//! The pipeline itself never caches; `Session` memoizes the three loaded
//! tables by `(path, mtime)` so repeated selections don't re-parse files.

use std::sync::Arc;

use crate::domain::{Observation, PipelineConfig, ReferenceObservation, SeriesDescriptor};
use crate::error::LoadError;
use crate::io::{FileCache, Table, load_catalog, load_prices, load_reference_prices};

/// The three input tables, shared read-only.
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub catalog: Arc<Table<SeriesDescriptor>>,
    pub prices: Arc<Table<Observation>>,
    pub reference: Arc<Table<ReferenceObservation>>,
}

pub struct Session {
    config: PipelineConfig,
    catalog: FileCache<Table<SeriesDescriptor>>,
    prices: FileCache<Table<Observation>>,
    reference: FileCache<Table<ReferenceObservation>>,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            catalog: FileCache::new(),
            prices: FileCache::new(),
            reference: FileCache::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn catalog(&mut self) -> Result<Arc<Table<SeriesDescriptor>>, LoadError> {
        let config = &self.config;
        self.catalog.get_or_load(&config.series_path, |path| {
            load_catalog(path, config.title_filter.as_deref(), config.min_end_year)
        })
    }

    pub fn prices(&mut self) -> Result<Arc<Table<Observation>>, LoadError> {
        let config = &self.config;
        self.prices
            .get_or_load(&config.price_path, |path| load_prices(path, config.min_year))
    }

    pub fn reference(&mut self) -> Result<Arc<Table<ReferenceObservation>>, LoadError> {
        let config = &self.config;
        self.reference
            .get_or_load(&config.reference_path, |path| load_reference_prices(path, config.min_year))
    }

    pub fn tables(&mut self) -> Result<LoadedTables, LoadError> {
        Ok(LoadedTables {
            catalog: self.catalog()?,
            prices: self.prices()?,
            reference: self.reference()?,
        })
    }

    /// Drop every cached table so the next access re-reads the files.
    pub fn invalidate(&mut self) {
        self.catalog.invalidate();
        self.prices.invalidate();
        self.reference.invalidate();
    }
}
