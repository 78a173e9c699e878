//! In-memory collaborators for pipeline integration tests.
//!
//! [`FakeForge`] implements every port with counters so tests can observe
//! which collaborator calls an operation made.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use addonhub_core::addon::model::{Actor, AddonRecord, Release, RepositoryInfo};
use addonhub_core::addon::ports::{
    AccessControl, AddonStore, ArchiveFormat, ArchiveLocation, ArchiveService, ArchiveTicket,
    CommitInfo, GitRepository, InsertOutcome, ReleaseStore, RepositoryAccess, RepositoryCatalog,
    ReviewNotifier, TreeEntry,
};
use addonhub_core::config::AddonConfig;
use addonhub_core::error::PortError;
use addonhub_core::types::DbId;

pub const ADMIN: Actor = Actor { user_id: 1 };
pub const MEMBER: Actor = Actor { user_id: 2 };

// ---------------------------------------------------------------------------
// Call counters
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub archive_requests: AtomicUsize,
    pub file_reads: AtomicUsize,
    pub tree_listings: AtomicUsize,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub release_updates: AtomicUsize,
    pub notifications: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Calls that touch repository content or archives.
    pub fn content_calls(&self) -> usize {
        Self::get(&self.opens)
            + Self::get(&self.archive_requests)
            + Self::get(&self.file_reads)
            + Self::get(&self.tree_listings)
    }

    pub fn writes(&self) -> usize {
        Self::get(&self.inserts) + Self::get(&self.updates) + Self::get(&self.release_updates)
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

// ---------------------------------------------------------------------------
// Repository content
// ---------------------------------------------------------------------------

/// Files and tree entries of a repository, identical at every revision.
#[derive(Debug, Clone, Default)]
pub struct RepoContent {
    pub manifest: Option<Vec<u8>>,
    pub entries: Vec<TreeEntry>,
}

struct FakeGitRepo {
    content: RepoContent,
    counters: Arc<Counters>,
}

#[async_trait]
impl GitRepository for FakeGitRepo {
    async fn get_commit(&self, revision: &str) -> Result<CommitInfo, PortError> {
        Ok(CommitInfo {
            id: revision.to_string(),
            time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        })
    }

    async fn get_file(&self, _commit_id: &str, path: &str) -> Result<Option<Vec<u8>>, PortError> {
        bump(&self.counters.file_reads);
        if path == "info" {
            Ok(self.content.manifest.clone())
        } else {
            Ok(None)
        }
    }

    async fn list_tree_entries(&self, _commit_id: &str) -> Result<Vec<TreeEntry>, PortError> {
        bump(&self.counters.tree_listings);
        Ok(self.content.entries.clone())
    }
}

// ---------------------------------------------------------------------------
// FakeForge
// ---------------------------------------------------------------------------

pub struct FakeForge {
    pub counters: Arc<Counters>,
    pub config: AddonConfig,
    archive_dir: tempfile::TempDir,
    pub repos: Mutex<HashMap<DbId, RepositoryInfo>>,
    pub releases: Mutex<HashMap<DbId, Release>>,
    pub records: Mutex<HashMap<DbId, AddonRecord>>,
    pub content: Mutex<HashMap<String, RepoContent>>,
    pub admins: HashSet<DbId>,
    pub notified: Mutex<Vec<(DbId, DbId)>>,
    pub fail_archive: AtomicBool,
    pub fail_notify: AtomicBool,
    pub fail_release_update: AtomicBool,
    /// Simulate another writer inserting the record first, for the given
    /// release, just before this process's insert lands.
    pub concurrent_insert: Mutex<Option<DbId>>,
    next_record_id: AtomicUsize,
}

impl FakeForge {
    pub fn new() -> Self {
        let archive_dir = tempfile::tempdir().expect("tempdir");
        let config = AddonConfig {
            app_url: "https://addons.example/".into(),
            archive_root: archive_dir.path().to_path_buf(),
            ..AddonConfig::default()
        };
        Self {
            counters: Arc::new(Counters::default()),
            config,
            archive_dir,
            repos: Mutex::new(HashMap::new()),
            releases: Mutex::new(HashMap::new()),
            records: Mutex::new(HashMap::new()),
            content: Mutex::new(HashMap::new()),
            admins: HashSet::from([ADMIN.user_id]),
            notified: Mutex::new(Vec::new()),
            fail_archive: AtomicBool::new(false),
            fail_notify: AtomicBool::new(false),
            fail_release_update: AtomicBool::new(false),
            concurrent_insert: Mutex::new(None),
            next_record_id: AtomicUsize::new(100),
        }
    }

    /// Register a repository with a valid manifest and the given content.
    pub fn add_repo(&self, id: DbId, name: &str, topics: &[&str], manifest: &str) -> RepositoryInfo {
        let repo = RepositoryInfo {
            id,
            owner_id: 10 + id,
            owner_name: "penny".into(),
            name: name.into(),
            description: format!("The {name} add-on"),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            is_template: false,
            is_private: false,
            is_fork: false,
            is_mirror: false,
            is_empty: false,
        };
        self.repos.lock().unwrap().insert(id, repo.clone());
        self.set_content(
            &repo,
            RepoContent {
                manifest: Some(manifest.as_bytes().to_vec()),
                entries: vec![
                    TreeEntry::file("info"),
                    TreeEntry::dir("screenshots"),
                    TreeEntry::file("screenshots/a.png"),
                    TreeEntry::file("screenshots/sub/b.png"),
                    TreeEntry::file("screenshots/noext"),
                    TreeEntry::file("other/c.png"),
                ],
            },
        );
        repo
    }

    pub fn set_content(&self, repo: &RepositoryInfo, content: RepoContent) {
        self.content
            .lock()
            .unwrap()
            .insert(format!("{}/{}", repo.owner_name, repo.name), content);
    }

    pub fn add_release(&self, id: DbId, repo_id: DbId, sha1: &str) -> Release {
        let release = Release {
            id,
            repo_id,
            tag_name: format!("v{id}"),
            sha1: sha1.into(),
            title: format!("Release {id}"),
            note: "Notes".into(),
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
            is_verified: false,
            is_rejected: false,
            rejection_reason: String::new(),
            reviewed_at: None,
        };
        self.releases.lock().unwrap().insert(id, release.clone());
        release
    }

    /// Store a verified record directly, bypassing regeneration.
    pub fn put_record(&self, repo_id: DbId, release_id: Option<DbId>, manifest: &str) {
        let record = AddonRecord {
            id: Some(repo_id),
            repo_id,
            release_id,
            manifest: manifest.into(),
            md5: format!("md5-{repo_id}"),
            screenshots: vec![],
        };
        self.records.lock().unwrap().insert(repo_id, record);
    }

    pub fn record(&self, repo_id: DbId) -> Option<AddonRecord> {
        self.records.lock().unwrap().get(&repo_id).cloned()
    }

    pub fn set_note(&self, release_id: DbId, note: &str) {
        if let Some(release) = self.releases.lock().unwrap().get_mut(&release_id) {
            release.note = note.into();
        }
    }

    pub fn stored_release(&self, id: DbId) -> Release {
        self.releases.lock().unwrap()[&id].clone()
    }

    /// Bytes the fake archive layer writes for a revision.
    pub fn archive_bytes(repo_id: DbId, revision: &str) -> Vec<u8> {
        format!("PK-archive-{repo_id}-{revision}").into_bytes()
    }
}

#[async_trait]
impl RepositoryAccess for FakeForge {
    async fn open_repository(
        &self,
        owner_name: &str,
        repo_name: &str,
    ) -> Result<Box<dyn GitRepository>, PortError> {
        bump(&self.counters.opens);
        let content = self
            .content
            .lock()
            .unwrap()
            .get(&format!("{owner_name}/{repo_name}"))
            .cloned()
            .ok_or("repository does not exist on disk")?;
        Ok(Box::new(FakeGitRepo {
            content,
            counters: Arc::clone(&self.counters),
        }))
    }
}

#[async_trait]
impl ArchiveService for FakeForge {
    async fn request_archive(
        &self,
        repo_id: DbId,
        _repo: &dyn GitRepository,
        revision: &str,
        format: ArchiveFormat,
    ) -> Result<ArchiveTicket, PortError> {
        bump(&self.counters.archive_requests);
        Ok(ArchiveTicket {
            repo_id,
            revision: revision.to_string(),
            format,
        })
    }

    async fn await_archive(&self, ticket: ArchiveTicket) -> Result<ArchiveLocation, PortError> {
        if self.fail_archive.load(Ordering::SeqCst) {
            return Err("archiver crashed".into());
        }
        let relative_path = PathBuf::from(format!(
            "{}/{}.{}",
            ticket.repo_id,
            ticket.revision,
            ticket.format.extension()
        ));
        let full = self.archive_dir.path().join(&relative_path);
        std::fs::create_dir_all(full.parent().unwrap())?;
        std::fs::write(&full, Self::archive_bytes(ticket.repo_id, &ticket.revision))?;
        Ok(ArchiveLocation { relative_path })
    }
}

#[async_trait]
impl AddonStore for FakeForge {
    async fn find_by_repo(&self, repo_id: DbId) -> Result<Option<AddonRecord>, PortError> {
        Ok(self.record(repo_id))
    }

    async fn insert(&self, record: &AddonRecord) -> Result<InsertOutcome, PortError> {
        bump(&self.counters.inserts);
        let mut records = self.records.lock().unwrap();
        if let Some(release_id) = self.concurrent_insert.lock().unwrap().take() {
            let mut winner = record.clone();
            winner.id = Some(999);
            winner.release_id = Some(release_id);
            winner.md5 = format!("md5-winner-{release_id}");
            records.insert(record.repo_id, winner);
        }
        if records.contains_key(&record.repo_id) {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = self.next_record_id.fetch_add(1, Ordering::SeqCst) as DbId;
        let mut stored = record.clone();
        stored.id = Some(id);
        records.insert(record.repo_id, stored);
        Ok(InsertOutcome::Inserted(id))
    }

    async fn update_all(&self, record: &AddonRecord) -> Result<(), PortError> {
        bump(&self.counters.updates);
        self.records
            .lock()
            .unwrap()
            .insert(record.repo_id, record.clone());
        Ok(())
    }
}

#[async_trait]
impl RepositoryCatalog for FakeForge {
    async fn find_repository(&self, repo_id: DbId) -> Result<Option<RepositoryInfo>, PortError> {
        Ok(self.repos.lock().unwrap().get(&repo_id).cloned())
    }

    async fn find_release(
        &self,
        repo_id: DbId,
        release_id: DbId,
    ) -> Result<Option<Release>, PortError> {
        Ok(self
            .releases
            .lock()
            .unwrap()
            .get(&release_id)
            .filter(|r| r.repo_id == repo_id)
            .cloned())
    }
}

#[async_trait]
impl ReleaseStore for FakeForge {
    async fn update_review(&self, release: &Release) -> Result<(), PortError> {
        bump(&self.counters.release_updates);
        if self.fail_release_update.load(Ordering::SeqCst) {
            return Err("releases table is read-only".into());
        }
        self.releases
            .lock()
            .unwrap()
            .insert(release.id, release.clone());
        Ok(())
    }
}

#[async_trait]
impl AccessControl for FakeForge {
    async fn is_administrator(&self, actor: &Actor) -> Result<bool, PortError> {
        Ok(self.admins.contains(&actor.user_id))
    }
}

#[async_trait]
impl ReviewNotifier for FakeForge {
    async fn notify_owner_of_review(
        &self,
        repo: &RepositoryInfo,
        release: &Release,
    ) -> Result<(), PortError> {
        bump(&self.counters.notifications);
        if self.fail_notify.load(Ordering::SeqCst) {
            return Err("mail relay down".into());
        }
        self.notified
            .lock()
            .unwrap()
            .push((repo.owner_id, release.id));
        Ok(())
    }
}
