//! Background execution of session operations.
//!
//! Loading and analysis/export run as tokio tasks so that the interactive
//! loop stays responsive.  At most one load and one analysis/export may be
//! in flight; further attempts are rejected, not queued.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::{sync::RwLock, task::JoinHandle};

use crate::{
    dataset::{Dataset, DuplicatePolicy},
    err::Error,
    output::OutputRecord,
    tracker::EditOutcome,
    view::{Notice, Panel, ViewEntry},
};

use crate::session::Session;

/// Holds a busy flag for the lifetime of the guard.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    /// Set `flag`, failing if it is already set.
    pub fn acquire(flag: &Arc<AtomicBool>, what: &'static str) -> Result<Self, Error> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::AlreadyInProgress(what))?;
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Summary of a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub samples: usize,
}

/// Wait for a background operation and flatten its result.
pub async fn join<T>(handle: JoinHandle<Result<T, Error>>) -> Result<T, Error> {
    handle.await.map_err(|e| Error::Task(e.to_string()))?
}

/// Runs session operations in the background.
#[derive(Debug, Clone)]
pub struct Worker {
    session: Arc<RwLock<Session>>,
    loading: Arc<AtomicBool>,
    analyzing: Arc<AtomicBool>,
    duplicate_policy: DuplicatePolicy,
}

impl Worker {
    pub fn new(session: Session, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            loading: Arc::new(AtomicBool::new(false)),
            analyzing: Arc::new(AtomicBool::new(false)),
            duplicate_policy,
        }
    }

    /// Shared handle to the session.
    pub fn session(&self) -> Arc<RwLock<Session>> {
        self.session.clone()
    }

    /// Start loading the dataset at `path`.
    ///
    /// The session is locked for writing before this returns, so any
    /// operation issued afterwards sees the new dataset (or, if loading
    /// fails, the previous one).
    pub async fn load(
        &self,
        path: PathBuf,
    ) -> Result<JoinHandle<Result<LoadSummary, Error>>, Error> {
        let guard = BusyGuard::acquire(&self.loading, "Loading")?;
        let mut session = self.session.clone().write_owned().await;
        let policy = self.duplicate_policy;
        Ok(tokio::spawn(async move {
            let _guard = guard;
            let dataset = join(tokio::task::spawn_blocking(move || {
                Dataset::load(path, policy)
            }))
            .await?;
            let summary = LoadSummary {
                rows: dataset.len(),
                samples: dataset.sample_ids().len(),
            };
            session.replace_dataset(dataset);
            Ok(summary)
        }))
    }

    /// Start analyzing the selected sample.
    pub async fn analyze(&self) -> Result<JoinHandle<Result<Vec<ViewEntry>, Error>>, Error> {
        let guard = BusyGuard::acquire(&self.analyzing, "Analysis")?;
        let session = self.session.clone().read_owned().await;
        Ok(tokio::spawn(async move {
            let _guard = guard;
            session.analyze()
        }))
    }

    /// Start writing the appearance input file, to the default path unless
    /// `path` is given.
    pub async fn export(
        &self,
        path: Option<PathBuf>,
    ) -> Result<JoinHandle<Result<(PathBuf, OutputRecord), Error>>, Error> {
        let guard = BusyGuard::acquire(&self.analyzing, "Analysis")?;
        let session = self.session.clone().read_owned().await;
        Ok(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let path = match path {
                Some(path) => path,
                None => session.default_export_path()?,
            };
            let record = session.export_to(&path)?;
            Ok((path, record))
        }))
    }

    /// Start writing the raw genotypes of `panel`.
    pub async fn export_raw(
        &self,
        path: PathBuf,
        header: Vec<&'static str>,
    ) -> Result<JoinHandle<Result<OutputRecord, Error>>, Error> {
        let guard = BusyGuard::acquire(&self.analyzing, "Analysis")?;
        let session = self.session.clone().read_owned().await;
        Ok(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            session.export_raw_to(&path, &header)
        }))
    }

    /// Start writing the input data with the edited genotypes.
    pub async fn save_modified(
        &self,
        path: Option<PathBuf>,
    ) -> Result<JoinHandle<Result<(PathBuf, usize), Error>>, Error> {
        let guard = BusyGuard::acquire(&self.analyzing, "Analysis")?;
        let session = self.session.clone().read_owned().await;
        Ok(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let path = path.unwrap_or_else(|| session.default_modified_path());
            let replaced = session.save_modified_to(&path)?;
            Ok((path, replaced))
        }))
    }

    pub async fn select_sample(&self, sample_id: &str) -> Result<Vec<Notice>, Error> {
        self.session.write().await.select_sample(sample_id)
    }

    pub async fn set_panel(&self, panel: Panel) -> Result<Vec<Notice>, Error> {
        self.session.write().await.set_panel(panel)
    }

    pub async fn edit(&self, marker_id: &str, value: &str) -> Result<EditOutcome, Error> {
        self.session.write().await.edit(marker_id, value)
    }
}

#[cfg(test)]
mod test {
    use std::{
        path::PathBuf,
        sync::{atomic::AtomicBool, Arc},
    };

    use pretty_assertions::assert_eq;

    use super::{join, BusyGuard, LoadSummary, Worker};
    use crate::{dataset::DuplicatePolicy, err::Error, session::Session};

    fn worker() -> Worker {
        Worker::new(Session::default(), DuplicatePolicy::Warn)
    }

    #[test]
    fn busy_guard() {
        let flag = Arc::new(AtomicBool::new(false));

        let guard = BusyGuard::acquire(&flag, "Loading").unwrap();
        assert!(matches!(
            BusyGuard::acquire(&flag, "Loading"),
            Err(Error::AlreadyInProgress("Loading"))
        ));
        drop(guard);

        assert!(BusyGuard::acquire(&flag, "Loading").is_ok());
    }

    #[tokio::test]
    async fn load_select_export() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let worker = worker();

        let handle = worker.load(PathBuf::from("tests/data/genotypes.csv")).await?;
        // issued before awaiting the load and still sees the new data
        worker.select_sample("S1").await?;
        assert_eq!(LoadSummary { rows: 13, samples: 2 }, join(handle).await?);

        worker.edit("rs2196051", "A/G").await?;
        let (path, record) = join(worker.export(Some(tmp_dir.join("out.csv"))).await?).await?;

        assert!(path.exists());
        assert_eq!(Some("S1"), record.get("sampleid"));
        assert_eq!(Some("1"), record.get("rs12913832_T"));

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_load_is_rejected() -> Result<(), anyhow::Error> {
        let worker = worker();

        let handle = worker.load(PathBuf::from("tests/data/genotypes.csv")).await?;
        let second = worker.load(PathBuf::from("tests/data/genotypes.csv")).await;
        assert!(matches!(second, Err(Error::AlreadyInProgress("Loading"))));

        join(handle).await?;
        // released after completion
        join(worker.load(PathBuf::from("tests/data/genotypes.csv")).await?).await?;

        Ok(())
    }

    #[tokio::test]
    async fn failed_load_keeps_data_and_releases_flag() -> Result<(), anyhow::Error> {
        let worker = worker();
        join(worker.load(PathBuf::from("tests/data/genotypes.csv")).await?).await?;

        let result = join(worker.load(PathBuf::from("tests/data/missing.csv")).await?).await;
        assert!(matches!(result, Err(Error::DataLoad(_))));

        // prior data still usable
        worker.select_sample("S2").await?;
        // flag released despite the failure
        join(worker.load(PathBuf::from("tests/data/genotypes.csv")).await?).await?;

        Ok(())
    }

    #[tokio::test]
    async fn analyze_without_data() -> Result<(), anyhow::Error> {
        let worker = worker();

        let result = join(worker.analyze().await?).await;
        assert!(matches!(result, Err(Error::NoDataLoaded)));

        // flag released after the failed analysis
        let result = join(worker.analyze().await?).await;
        assert!(matches!(result, Err(Error::NoDataLoaded)));

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_export_is_rejected() -> Result<(), anyhow::Error> {
        let worker = worker();
        join(worker.load(PathBuf::from("tests/data/genotypes.csv")).await?).await?;
        worker.select_sample("S1").await?;

        let handle = worker.analyze().await?;
        let second = worker.export(None).await;
        assert!(matches!(second, Err(Error::AlreadyInProgress("Analysis"))));

        let entries = join(handle).await?;
        assert_eq!(6, entries.len());

        Ok(())
    }

    #[tokio::test]
    async fn save_modified() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let worker = worker();
        join(worker.load(PathBuf::from("tests/data/genotypes.csv")).await?).await?;
        worker.select_sample("S1").await?;
        worker.edit("rs1495085", "A/G").await?;

        let (_, replaced) =
            join(worker.save_modified(Some(tmp_dir.join("modified.csv"))).await?).await?;

        assert_eq!(1, replaced);

        Ok(())
    }
}
