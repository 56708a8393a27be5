use std::{
    fs::{self, File},
    io::{ErrorKind, Read, Write},
    path::PathBuf,
};

use crate::entities::Todo;

use super::{StoreError, StoreResult};

/// Durable home of the committed records.
pub trait Backend {
    fn load(&self) -> StoreResult<Vec<Todo>>;
    fn persist(&self, records: &[Todo]) -> StoreResult<()>;
}

/// Bincode-encoded `Vec<Todo>` in a single file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl Backend for FileBackend {
    fn load(&self) -> StoreResult<Vec<Todo>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|err| StoreError::io(&self.path, err))?;
        if buffer.is_empty() {
            return Ok(Vec::new());
        }
        Ok(bincode::deserialize(&buffer)?)
    }

    fn persist(&self, records: &[Todo]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        let encoded = bincode::serialize(records)?;

        // Write aside and rename so a failed write never clobbers the last commit.
        let tmp = self.tmp_path();
        let mut file = File::create(&tmp).map_err(|err| StoreError::io(&tmp, err))?;
        file.write_all(&encoded)
            .and_then(|_| file.sync_all())
            .map_err(|err| StoreError::io(&tmp, err))?;
        fs::rename(&tmp, &self.path).map_err(|err| StoreError::io(&self.path, err))?;
        Ok(())
    }
}
