//! Manifest loader (spec §4.7): one executable path per line, allocated into
//! the descriptor store and enqueued on the ready queue in file order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::descriptor::DescriptorStore;
use crate::error::OpenFailed;
use crate::queue::Queue;
use crate::report;

/// Reads `path`, allocating one descriptor per non-blank line and enqueuing
/// it on `ready`. Blank lines are skipped (spec §9 Design Notes resolves the
/// source's "empty route that fails to spawn" ambiguity this way).
pub fn load(path: &Path, store: &mut DescriptorStore, ready: &mut Queue) -> anyhow::Result<()> {
    let contents = fs::read_to_string(path).map_err(|source| OpenFailed {
        path: path.display().to_string(),
        source,
    })?;

    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }
        let executable_name = executable_name_of(line);
        let handle = store.allocate(executable_name.clone(), PathBuf::from(line), SystemTime::now());
        ready.enqueue(handle);
        report::enqueued(&executable_name);
        debug!(route = line, "enqueued");
    }

    Ok(())
}

/// Substring after the last `/`, or the whole line if no `/` is present
/// (spec §4.7 / §3).
fn executable_name_of(route: &str) -> String {
    match route.rfind('/') {
        Some(idx) => route[idx + 1..].to_string(),
        None => route.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_name_strips_directory() {
        assert_eq!(executable_name_of("./work/work7"), "work7");
        assert_eq!(executable_name_of("/usr/bin/sleep"), "sleep");
        assert_eq!(executable_name_of("plainname"), "plainname");
    }

    #[test]
    fn load_skips_blank_lines_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.txt");
        fs::write(&manifest_path, "./a\n\n./b\n./c\n").unwrap();

        let mut store = DescriptorStore::new();
        let mut ready = Queue::new();
        load(&manifest_path, &mut store, &mut ready).unwrap();

        assert_eq!(store.len(), 3);
        let first = ready.dequeue().unwrap();
        assert_eq!(store.get(first).executable_name, "a");
        let second = ready.dequeue().unwrap();
        assert_eq!(store.get(second).executable_name, "b");
        let third = ready.dequeue().unwrap();
        assert_eq!(store.get(third).executable_name, "c");
        assert!(ready.is_empty());
    }

    #[test]
    fn load_missing_file_errors() {
        let mut store = DescriptorStore::new();
        let mut ready = Queue::new();
        let err = load(Path::new("/nonexistent/path/manifest.txt"), &mut store, &mut ready)
            .unwrap_err();
        assert!(err.downcast_ref::<OpenFailed>().is_some());
    }

    #[test]
    fn load_empty_manifest_enqueues_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.txt");
        fs::write(&manifest_path, "").unwrap();

        let mut store = DescriptorStore::new();
        let mut ready = Queue::new();
        load(&manifest_path, &mut store, &mut ready).unwrap();
        assert!(store.is_empty());
        assert!(ready.is_empty());
    }
}
