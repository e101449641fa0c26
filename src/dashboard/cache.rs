use log::{debug, info};
use registration_stats::Dataset;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::dashboard::DashResult;

/// The datasets already read in this session, by file path.
///
/// Entries stay until `invalidate` is called. Failed loads are not remembered,
/// so the next request tries the file again.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Rc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> DatasetCache {
        DatasetCache {
            entries: HashMap::new(),
        }
    }

    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> DashResult<Rc<Dataset>>
    where
        F: FnOnce(&Path) -> DashResult<Dataset>,
    {
        if let Some(ds) = self.entries.get(path) {
            debug!("get_or_load: cache hit for {:?}", path);
            return Ok(ds.clone());
        }
        let ds = Rc::new(load(path)?);
        self.entries.insert(path.to_path_buf(), ds.clone());
        Ok(ds)
    }

    /// Forgets every loaded dataset.
    pub fn invalidate(&mut self) {
        info!("invalidate: dropping {} cached datasets", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardError;
    use registration_stats::builder::DatasetBuilder;
    use registration_stats::Field;
    use std::cell::Cell;

    fn one_row(_: &Path) -> DashResult<Dataset> {
        let mut builder = DatasetBuilder::new(&Field::ALL);
        builder.add_simple("Ana", "Lider1", "VIP", None);
        Ok(builder.build())
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let calls = Cell::new(0);
        let mut cache = DatasetCache::new();
        let p = Path::new("registros.xlsx");
        for _ in 0..3 {
            let ds = cache
                .get_or_load(p, |p| {
                    calls.set(calls.get() + 1);
                    one_row(p)
                })
                .unwrap();
            assert_eq!(ds.len(), 1);
        }
        assert_eq!(calls.get(), 1);

        cache.invalidate();
        assert!(cache.is_empty());
        cache
            .get_or_load(p, |p| {
                calls.set(calls.get() + 1);
                one_row(p)
            })
            .unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn paths_are_cached_separately() {
        let mut cache = DatasetCache::new();
        cache.get_or_load(Path::new("a.csv"), one_row).unwrap();
        cache.get_or_load(Path::new("b.csv"), one_row).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = DatasetCache::new();
        let res = cache.get_or_load(Path::new("x.csv"), |p| {
            Err(DashboardError::EmptyCsv {
                path: p.display().to_string(),
            })
        });
        assert!(res.is_err());
        assert!(cache.is_empty());
    }
}
