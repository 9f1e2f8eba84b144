//! Scripted version control for committer tests

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::vcs::{VcsError, VcsRepository, VersionControl};

pub const SCRIPTED_COMMIT_ID: &str = "0123456789abcdef0123456789abcdef01234567";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Never,
    Open,
    Stage,
    Commit,
    Push,
    PushHangs,
}

#[derive(Default)]
struct Calls {
    /// Paths currently in the index.
    staged: Vec<PathBuf>,
    unstaged: Vec<PathBuf>,
    pushes: usize,
}

pub struct ScriptedVersionControl {
    workdir: PathBuf,
    fail_at: FailAt,
    calls: Arc<Mutex<Calls>>,
}

impl ScriptedVersionControl {
    pub fn new(workdir: &Path, fail_at: FailAt) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            fail_at,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    pub fn staged(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().staged.clone()
    }

    pub fn unstaged(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().unstaged.clone()
    }

    pub fn pushes(&self) -> usize {
        self.calls.lock().unwrap().pushes
    }
}

impl VersionControl for ScriptedVersionControl {
    fn open(&self, root: &Path) -> Result<Box<dyn VcsRepository>, VcsError> {
        if self.fail_at == FailAt::Open {
            return Err(VcsError::NotARepository {
                path: root.to_path_buf(),
                message: "could not find repository".to_string(),
            });
        }
        Ok(Box::new(ScriptedRepository {
            workdir: self.workdir.clone(),
            fail_at: self.fail_at,
            calls: self.calls.clone(),
        }))
    }
}

struct ScriptedRepository {
    workdir: PathBuf,
    fail_at: FailAt,
    calls: Arc<Mutex<Calls>>,
}

impl VcsRepository for ScriptedRepository {
    fn workdir(&self) -> Option<PathBuf> {
        Some(self.workdir.clone())
    }

    fn stage(&self, relative_path: &Path) -> Result<(), VcsError> {
        if self.fail_at == FailAt::Stage {
            return Err(VcsError::Stage {
                path: relative_path.to_path_buf(),
                message: "index is locked".to_string(),
            });
        }
        self.calls
            .lock()
            .unwrap()
            .staged
            .push(relative_path.to_path_buf());
        Ok(())
    }

    fn unstage(&self, relative_path: &Path) -> Result<(), VcsError> {
        let mut calls = self.calls.lock().unwrap();
        calls.staged.retain(|path| path != relative_path);
        calls.unstaged.push(relative_path.to_path_buf());
        Ok(())
    }

    fn commit(&self, _message: &str) -> Result<String, VcsError> {
        if self.fail_at == FailAt::Commit {
            return Err(VcsError::Commit("failed to write tree".to_string()));
        }
        Ok(SCRIPTED_COMMIT_ID.to_string())
    }

    fn push(&self, remote: &str) -> Result<(), VcsError> {
        self.calls.lock().unwrap().pushes += 1;
        match self.fail_at {
            FailAt::Push => Err(VcsError::Push {
                remote: remote.to_string(),
                message: "remote rejected: non-fast-forward".to_string(),
            }),
            FailAt::PushHangs => {
                std::thread::sleep(Duration::from_secs(2));
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
