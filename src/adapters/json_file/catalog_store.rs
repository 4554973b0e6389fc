use crate::ports::catalog_store::{
    BookRecord, CatalogSnapshot, CatalogStore as CatalogStoreTrait, MemberRecord, Result,
};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// JSONファイルストアのエラー
#[derive(Debug, Error)]
pub enum JsonStoreError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// CatalogStoreのJSONファイル実装
///
/// 書籍と会員をそれぞれ別ファイルに、キー→レコードのマップとして保存する。
/// ファイルが存在しない場合は空として扱う。
pub struct CatalogStore {
    books_path: PathBuf,
    members_path: PathBuf,
}

impl CatalogStore {
    pub fn new(books_path: impl Into<PathBuf>, members_path: impl Into<PathBuf>) -> Self {
        Self {
            books_path: books_path.into(),
            members_path: members_path.into(),
        }
    }

    pub fn books_path(&self) -> &Path {
        &self.books_path
    }

    pub fn members_path(&self) -> &Path {
        &self.members_path
    }
}

/// ファイルを読み込んでマップにする（存在しなければ空）
async fn read_map<T: DeserializeOwned>(
    path: &Path,
) -> std::result::Result<BTreeMap<String, T>, JsonStoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} does not exist yet, starting empty", path.display());
            return Ok(BTreeMap::new());
        }
        Err(source) => {
            return Err(JsonStoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| JsonStoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// マップを整形済みJSONとして一時ファイルに書き込み、そのパスを返す
///
/// 本来のファイルには触れない。置き換えは `commit` で行う。
async fn write_staged<T: Serialize>(
    path: &Path,
    map: &BTreeMap<String, T>,
) -> std::result::Result<PathBuf, JsonStoreError> {
    let json = serde_json::to_vec_pretty(map).map_err(|source| JsonStoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    let staged = staged_path(path);
    let write_err = |source| JsonStoreError::Write {
        path: staged.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    if let Err(source) = tokio::fs::write(&staged, json).await {
        discard(&staged).await;
        return Err(write_err(source));
    }

    Ok(staged)
}

/// 一時ファイルで本来のファイルを置き換える
async fn commit(staged: &Path, path: &Path) -> std::result::Result<(), JsonStoreError> {
    match tokio::fs::rename(staged, path).await {
        Ok(()) => Ok(()),
        Err(source) => {
            discard(staged).await;
            Err(JsonStoreError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// 使われなかった一時ファイルを削除する（削除できなくてもエラーにはしない）
async fn discard(staged: &Path) {
    if let Err(e) = tokio::fs::remove_file(staged).await {
        tracing::debug!("Could not remove {}: {}", staged.display(), e);
    }
}

/// `books.json` → `books.json.tmp`
fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn load(&self) -> Result<CatalogSnapshot> {
        let books: BTreeMap<String, BookRecord> = read_map(&self.books_path).await?;
        let members: BTreeMap<String, MemberRecord> = read_map(&self.members_path).await?;

        Ok(CatalogSnapshot { books, members })
    }

    /// 2つのファイルを両方とも一時ファイルに書き終えてから置き換える
    ///
    /// どちらかの書き込みに失敗した場合、既存のファイルはどちらも変更されない。
    async fn save(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        let books_staged = write_staged(&self.books_path, &snapshot.books).await?;
        let members_staged = match write_staged(&self.members_path, &snapshot.members).await {
            Ok(staged) => staged,
            Err(e) => {
                discard(&books_staged).await;
                return Err(e.into());
            }
        };

        if let Err(e) = commit(&books_staged, &self.books_path).await {
            discard(&members_staged).await;
            return Err(e.into());
        }
        commit(&members_staged, &self.members_path).await?;

        tracing::debug!(
            "Wrote {} and {}",
            self.books_path.display(),
            self.members_path.display()
        );
        Ok(())
    }
}
